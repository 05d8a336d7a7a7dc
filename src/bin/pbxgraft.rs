#![forbid(unsafe_code)]

use pbxgraft::{
    assets::AssetSource,
    config::{self, Config, Raw},
    graft::{self, Outcome},
    pbxproj::Graph,
    util::cli::{self, Exec, GlobalFlags, Report, Reportable, TextWrapper},
    NAME,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pbxgraft",
    about = "Grafts app-extension targets into existing Xcode projects",
    settings = cli::SETTINGS,
)]
pub struct Input {
    #[structopt(flatten)]
    flags: GlobalFlags,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    #[structopt(name = "graft", about = "Adds the extension target to the project")]
    Graft {
        #[structopt(long = "platform-dir", help = "Directory that holds the .xcodeproj bundle")]
        platform_dir: PathBuf,
        #[structopt(long = "assets", help = "Directory the extension's seed files come from")]
        assets: PathBuf,
        #[structopt(long = "config", help = "TOML file of graft settings")]
        config: Option<PathBuf>,
        #[structopt(long = "target-name", help = "Name for the extension target")]
        target_name: Option<String>,
        #[structopt(long = "app-identifier", help = "Bundle identifier of the host app")]
        app_identifier: Option<String>,
        #[structopt(
            long = "extension-identifier",
            help = "Bundle identifier for the extension (defaults to <app-identifier>.<target-name>)"
        )]
        extension_identifier: Option<String>,
        #[structopt(long = "ios-version", help = "iOS deployment target")]
        ios_version: Option<String>,
        #[structopt(long = "swift-version", help = "Swift language version")]
        swift_version: Option<String>,
        #[structopt(long = "development-team", help = "Apple development team ID")]
        development_team: Option<String>,
        #[structopt(
            long = "host-target",
            help = "Which target embeds the extension (\"application\", \"first\", or a target name)"
        )]
        host_target: Option<String>,
    },
    #[structopt(name = "status", about = "Reports whether the extension target is present")]
    Status {
        #[structopt(long = "platform-dir", help = "Directory that holds the .xcodeproj bundle")]
        platform_dir: PathBuf,
        #[structopt(long = "target-name", help = "Name of the extension target")]
        target_name: Option<String>,
    },
}

#[derive(Debug)]
pub enum Error {
    ConfigLoadFailed(config::LoadError),
    ConfigInvalid(config::Error),
    GraftFailed(graft::Error),
}

impl Reportable for Error {
    fn report(&self) -> Report {
        match self {
            Self::ConfigLoadFailed(err) => err.report(),
            Self::ConfigInvalid(err) => err.report("Invalid configuration"),
            Self::GraftFailed(err) => err.report(),
        }
    }
}

fn assemble_config(path: Option<PathBuf>, overrides: Raw) -> Result<Config, Error> {
    let raw = match path {
        Some(path) => Raw::load(&path)
            .map_err(Error::ConfigLoadFailed)?
            .overridden_with(overrides),
        None => overrides,
    };
    Config::from_raw(raw).map_err(Error::ConfigInvalid)
}

impl Exec for Input {
    type Report = Error;

    fn global_flags(&self) -> GlobalFlags {
        self.flags
    }

    fn exec(self, wrapper: &TextWrapper) -> Result<(), Self::Report> {
        match self.command {
            Command::Graft {
                platform_dir,
                assets,
                config,
                target_name,
                app_identifier,
                extension_identifier,
                ios_version,
                swift_version,
                development_team,
                host_target,
            } => {
                let overrides = Raw {
                    target_name,
                    app_identifier,
                    extension_identifier,
                    ios_version,
                    swift_version,
                    development_team,
                    host_target,
                };
                let config = assemble_config(config, overrides)?;
                let source = AssetSource::new(assets);
                match graft::run(&platform_dir, &source, &config).map_err(Error::GraftFailed)? {
                    Outcome::Created(grafted) => Report::victory(
                        format!("Target {:?} grafted into the project", config.target_name()),
                        format!("The new target's ID is {}", grafted.target),
                    )
                    .print(wrapper),
                    Outcome::AlreadyPresent { target_name } => Report::victory(
                        format!("Target {:?} is already present", target_name),
                        "Nothing needed to change",
                    )
                    .print(wrapper),
                    Outcome::SkippedNoProject => Report::action_request(
                        "No Xcode project was found, so nothing was grafted",
                        "Generate the project first, then run this again",
                    )
                    .print(wrapper),
                }
                Ok(())
            }
            Command::Status {
                platform_dir,
                target_name,
            } => {
                let target_name =
                    target_name.unwrap_or_else(|| config::DEFAULT_TARGET_NAME.to_owned());
                match graft::discover_project(&platform_dir).map_err(Error::GraftFailed)? {
                    Some(descriptor) => {
                        let src = std::fs::read_to_string(&descriptor).map_err(|cause| {
                            Error::GraftFailed(graft::Error::ReadFailed {
                                path: descriptor.clone(),
                                cause,
                            })
                        })?;
                        let graph = Graph::parse(&src).map_err(|cause| {
                            Error::GraftFailed(graft::Error::ParseFailed {
                                path: descriptor.clone(),
                                cause,
                            })
                        })?;
                        if graph.target_by_name(&target_name).is_some() {
                            println!("{:?} is present in {:?}", target_name, descriptor);
                        } else {
                            println!("{:?} is absent from {:?}", target_name, descriptor);
                        }
                    }
                    None => println!("no Xcode project under {:?}", platform_dir),
                }
                Ok(())
            }
        }
    }
}

fn main() {
    cli::exec::<Input>(NAME)
}
