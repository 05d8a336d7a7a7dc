//! Names and codes Xcode assigns to the object kinds this crate touches.

pub mod isa {
    pub const BUILD_FILE: &str = "PBXBuildFile";
    pub const FILE_REFERENCE: &str = "PBXFileReference";
    pub const GROUP: &str = "PBXGroup";
    pub const VARIANT_GROUP: &str = "PBXVariantGroup";
    pub const NATIVE_TARGET: &str = "PBXNativeTarget";
    pub const PROJECT: &str = "PBXProject";
    pub const SOURCES_BUILD_PHASE: &str = "PBXSourcesBuildPhase";
    pub const FRAMEWORKS_BUILD_PHASE: &str = "PBXFrameworksBuildPhase";
    pub const RESOURCES_BUILD_PHASE: &str = "PBXResourcesBuildPhase";
    pub const HEADERS_BUILD_PHASE: &str = "PBXHeadersBuildPhase";
    pub const COPY_FILES_BUILD_PHASE: &str = "PBXCopyFilesBuildPhase";
    pub const SHELL_SCRIPT_BUILD_PHASE: &str = "PBXShellScriptBuildPhase";
    pub const CONFIGURATION_LIST: &str = "XCConfigurationList";
    pub const BUILD_CONFIGURATION: &str = "XCBuildConfiguration";
}

pub mod product_type {
    pub const APPLICATION: &str = "com.apple.product-type.application";
    pub const APP_EXTENSION: &str = "com.apple.product-type.app-extension";
}

/// Wrapper file type for a target's built product.
pub fn product_file_type(product_type: &str) -> &'static str {
    match product_type {
        product_type::APP_EXTENSION => "wrapper.app-extension",
        _ => "wrapper.application",
    }
}

/// The `lastKnownFileType` Xcode records for a file added to the project by
/// name. Only the types this tool actually grafts get a precise mapping.
pub fn last_known_file_type(file_name: &str) -> &'static str {
    let extension = file_name.rsplit('.').next().unwrap_or_default();
    match extension {
        "swift" => "sourcecode.swift",
        "plist" => "text.plist.xml",
        "h" => "sourcecode.c.h",
        "m" => "sourcecode.c.objc",
        "storyboard" => "file.storyboard",
        "xcassets" => "folder.assetcatalog",
        _ => "text",
    }
}

/// Destinations a `PBXCopyFilesBuildPhase` can place its files in, with the
/// `dstSubfolderSpec` code Xcode serializes for each.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyDestination {
    AbsolutePath,
    Wrapper,
    Executables,
    Resources,
    Frameworks,
    SharedFrameworks,
    SharedSupport,
    PlugIns,
    JavaResources,
    ProductsDirectory,
}

impl CopyDestination {
    pub fn code(self) -> &'static str {
        match self {
            Self::AbsolutePath => "0",
            Self::Wrapper => "1",
            Self::Executables => "6",
            Self::Resources => "7",
            Self::Frameworks => "10",
            Self::SharedFrameworks => "11",
            Self::SharedSupport => "12",
            Self::PlugIns => "13",
            Self::JavaResources => "15",
            Self::ProductsDirectory => "16",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest(input, expected,
        case("NotificationService.swift", "sourcecode.swift"),
        case("Info.plist", "text.plist.xml"),
        case("Bridging-Header.h", "sourcecode.c.h"),
        case("README", "text")
    )]
    fn test_last_known_file_type(input: &str, expected: &str) {
        assert_eq!(last_known_file_type(input), expected);
    }

    #[test]
    fn test_plugins_destination_code() {
        assert_eq!(CopyDestination::PlugIns.code(), "13");
    }
}
