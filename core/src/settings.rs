//! Build settings for the generated configurations.

use crate::value::Dict;
use crate::value::Value;

/// Warnings and language settings shared by project-level Debug and Release.
const PROJECT_COMMON: &[(&str, &str)] = &[
    ("ALWAYS_SEARCH_USER_PATHS", "NO"),
    ("ASSETCATALOG_COMPILER_GENERATE_SWIFT_ASSET_SYMBOL_EXTENSIONS", "YES"),
    ("CLANG_ANALYZER_NONNULL", "YES"),
    ("CLANG_ANALYZER_NUMBER_OBJECT_CONVERSION", "YES_AGGRESSIVE"),
    ("CLANG_CXX_LANGUAGE_STANDARD", "gnu++20"),
    ("CLANG_ENABLE_MODULES", "YES"),
    ("CLANG_ENABLE_OBJC_ARC", "YES"),
    ("CLANG_ENABLE_OBJC_WEAK", "YES"),
    ("CLANG_WARN_BLOCK_CAPTURE_AUTORELEASING", "YES"),
    ("CLANG_WARN_BOOL_CONVERSION", "YES"),
    ("CLANG_WARN_COMMA", "YES"),
    ("CLANG_WARN_CONSTANT_CONVERSION", "YES"),
    ("CLANG_WARN_DEPRECATED_OBJC_IMPLEMENTATIONS", "YES"),
    ("CLANG_WARN_DIRECT_OBJC_ISA_USAGE", "YES_ERROR"),
    ("CLANG_WARN_DOCUMENTATION_COMMENTS", "YES"),
    ("CLANG_WARN_EMPTY_BODY", "YES"),
    ("CLANG_WARN_ENUM_CONVERSION", "YES"),
    ("CLANG_WARN_INFINITE_RECURSION", "YES"),
    ("CLANG_WARN_INT_CONVERSION", "YES"),
    ("CLANG_WARN_NON_LITERAL_NULL_CONVERSION", "YES"),
    ("CLANG_WARN_OBJC_IMPLICIT_RETAIN_SELF", "YES"),
    ("CLANG_WARN_OBJC_LITERAL_CONVERSION", "YES"),
    ("CLANG_WARN_OBJC_ROOT_CLASS", "YES_ERROR"),
    ("CLANG_WARN_QUOTED_INCLUDE_IN_FRAMEWORK_HEADER", "YES"),
    ("CLANG_WARN_RANGE_LOOP_ANALYSIS", "YES"),
    ("CLANG_WARN_STRICT_PROTOTYPES", "YES"),
    ("CLANG_WARN_SUSPICIOUS_MOVE", "YES"),
    ("CLANG_WARN_UNGUARDED_AVAILABILITY", "YES_AGGRESSIVE"),
    ("CLANG_WARN_UNREACHABLE_CODE", "YES"),
    ("CLANG_WARN__DUPLICATE_METHOD_MATCH", "YES"),
    ("COPY_PHASE_STRIP", "NO"),
    ("ENABLE_STRICT_OBJC_MSGSEND", "YES"),
    ("ENABLE_USER_SCRIPT_SANDBOXING", "YES"),
    ("GCC_C_LANGUAGE_STANDARD", "gnu17"),
    ("GCC_NO_COMMON_BLOCKS", "YES"),
    ("GCC_WARN_64_TO_32_BIT_CONVERSION", "YES"),
    ("GCC_WARN_ABOUT_RETURN_TYPE", "YES_ERROR"),
    ("GCC_WARN_UNDECLARED_SELECTOR", "YES"),
    ("GCC_WARN_UNINITIALIZED_AUTOS", "YES_AGGRESSIVE"),
    ("GCC_WARN_UNUSED_FUNCTION", "YES"),
    ("GCC_WARN_UNUSED_VARIABLE", "YES"),
    ("LOCALIZATION_PREFERS_STRING_CATALOGS", "YES"),
    ("MTL_FAST_MATH", "YES"),
    ("SDKROOT", "iphoneos"),
];

const PROJECT_DEBUG: &[(&str, &str)] = &[
    ("DEBUG_INFORMATION_FORMAT", "dwarf"),
    ("ENABLE_TESTABILITY", "YES"),
    ("GCC_DYNAMIC_NO_PIC", "NO"),
    ("GCC_OPTIMIZATION_LEVEL", "0"),
    ("MTL_ENABLE_DEBUG_INFO", "INCLUDE_SOURCE"),
    ("ONLY_ACTIVE_ARCH", "YES"),
    ("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG $(inherited)"),
    ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
];

const PROJECT_RELEASE: &[(&str, &str)] = &[
    ("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym"),
    ("ENABLE_NS_ASSERTIONS", "NO"),
    ("MTL_ENABLE_DEBUG_INFO", "NO"),
    ("SWIFT_COMPILATION_MODE", "wholemodule"),
    ("VALIDATE_PRODUCT", "YES"),
];

/// Application target settings; identical for Debug and Release.
const TARGET_COMMON: &[(&str, &str)] = &[
    ("ASSETCATALOG_COMPILER_APPICON_NAME", "AppIcon"),
    ("ASSETCATALOG_COMPILER_GLOBAL_ACCENT_COLOR_NAME", "AccentColor"),
    ("CODE_SIGN_STYLE", "Automatic"),
    ("CURRENT_PROJECT_VERSION", "1"),
    ("DEVELOPMENT_ASSET_PATHS", ""),
    ("ENABLE_PREVIEWS", "YES"),
    ("GENERATE_INFOPLIST_FILE", "NO"),
    ("INFOPLIST_KEY_UIApplicationSceneManifest_Generation", "YES"),
    ("INFOPLIST_KEY_UIApplicationSupportsIndirectInputEvents", "YES"),
    ("INFOPLIST_KEY_UILaunchScreen_Generation", "YES"),
    (
        "INFOPLIST_KEY_UISupportedInterfaceOrientations_iPad",
        "UIInterfaceOrientationPortrait UIInterfaceOrientationPortraitUpsideDown UIInterfaceOrientationLandscapeLeft UIInterfaceOrientationLandscapeRight",
    ),
    (
        "INFOPLIST_KEY_UISupportedInterfaceOrientations_iPhone",
        "UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeLeft UIInterfaceOrientationLandscapeRight",
    ),
    ("MARKETING_VERSION", "1.0"),
    ("PRODUCT_NAME", "$(TARGET_NAME)"),
    ("SWIFT_EMIT_LOC_STRINGS", "YES"),
    ("TARGETED_DEVICE_FAMILY", "1,2"),
];

/// Which of the two standard configurations a settings block is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    Debug,
    Release,
}

impl Configuration {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

/// Project-level settings.
pub fn project_settings(configuration: Configuration, deployment_target: &str) -> Dict {
    let mut settings = Dict::from_pairs(PROJECT_COMMON.iter().copied());
    let specific = match configuration {
        Configuration::Debug => PROJECT_DEBUG,
        Configuration::Release => PROJECT_RELEASE,
    };
    for (key, value) in specific {
        settings.insert(*key, *value);
    }
    if configuration == Configuration::Debug {
        settings.insert(
            "GCC_PREPROCESSOR_DEFINITIONS",
            Value::strings(["DEBUG=1", "$(inherited)"]),
        );
    }
    settings.insert("IPHONEOS_DEPLOYMENT_TARGET", deployment_target);
    settings.sort_keys();
    settings
}

/// Application target settings, parameterized by project name and bundle id.
pub fn target_settings(project_name: &str, bundle_id: &str, swift_version: &str) -> Dict {
    let mut settings = Dict::from_pairs(TARGET_COMMON.iter().copied());
    settings.insert("INFOPLIST_FILE", format!("{project_name}/Info.plist"));
    settings.insert(
        "LD_RUNPATH_SEARCH_PATHS",
        Value::strings(["$(inherited)", "@executable_path/Frameworks"]),
    );
    settings.insert("PRODUCT_BUNDLE_IDENTIFIER", bundle_id);
    settings.insert("SWIFT_VERSION", swift_version);
    settings.sort_keys();
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_release_differ_where_expected() {
        let debug = project_settings(Configuration::Debug, "15.0");
        let release = project_settings(Configuration::Release, "15.0");
        assert_eq!(debug.get_str("GCC_OPTIMIZATION_LEVEL"), Some("0"));
        assert!(release.get("GCC_OPTIMIZATION_LEVEL").is_none());
        assert_eq!(release.get_str("SWIFT_COMPILATION_MODE"), Some("wholemodule"));
        assert!(release.get("GCC_PREPROCESSOR_DEFINITIONS").is_none());
        assert_eq!(debug.get_str("IPHONEOS_DEPLOYMENT_TARGET"), Some("15.0"));
    }

    #[test]
    fn settings_are_sorted() {
        let settings = target_settings("Demo", "com.example.demo", "5.0");
        let keys: Vec<_> = settings.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(settings.get_str("INFOPLIST_FILE"), Some("Demo/Info.plist"));
        assert_eq!(
            settings.get_str("PRODUCT_BUNDLE_IDENTIFIER"),
            Some("com.example.demo")
        );
    }
}
