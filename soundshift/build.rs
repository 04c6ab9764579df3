// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    compiler: CompilerLimits,
    inventory: InventoryLimits,
    reverser: ReverserLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_line_length: usize,
}

#[derive(serde::Deserialize)]
struct CompilerLimits {
    max_statements: usize,
    max_variables: usize,
    max_variable_depth: usize,
    max_optional_groups_per_side: usize,
    max_rules_per_statement: usize,
}

#[derive(serde::Deserialize)]
struct InventoryLimits {
    max_phonemes: usize,
    max_patterns: usize,
}

#[derive(serde::Deserialize)]
struct ReverserLimits {
    max_cache_entries: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_words_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SOUNDSHIFT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SOUNDSHIFT_CONFIG_DIR");

    let profile =
        env::var("SOUNDSHIFT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SOUNDSHIFT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Config lives at the workspace root, one level above this crate
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    // 2^k context variants per side; anything past this cannot finish
    const ABSOLUTE_MAX_OPTIONAL_GROUPS: usize = 20;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.compiler.max_optional_groups_per_side > ABSOLUTE_MAX_OPTIONAL_GROUPS {
        panic!("LIMITS: max_optional_groups_per_side exceeds absolute maximum");
    }

    if config.compiler.max_variable_depth == 0 {
        panic!("LIMITS: max_variable_depth must be at least 1");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("LIMITS: max_worker_threads must be at least 1");
    }

    if profile == "production" && config.compiler.max_rules_per_statement > 100_000 {
        panic!("PRODUCTION: max_rules_per_statement too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_LINE_LENGTH: usize = {};
    }}

    pub mod compiler {{
        pub const MAX_STATEMENTS: usize = {};
        pub const MAX_VARIABLES: usize = {};
        pub const MAX_VARIABLE_DEPTH: usize = {};
        pub const MAX_OPTIONAL_GROUPS_PER_SIDE: usize = {};
        pub const MAX_RULES_PER_STATEMENT: usize = {};
    }}

    pub mod inventory {{
        pub const MAX_PHONEMES: usize = {};
        pub const MAX_PATTERNS: usize = {};
    }}

    pub mod reverser {{
        pub const MAX_CACHE_ENTRIES: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_WORDS_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.max_line_length,
        config.compiler.max_statements,
        config.compiler.max_variables,
        config.compiler.max_variable_depth,
        config.compiler.max_optional_groups_per_side,
        config.compiler.max_rules_per_statement,
        config.inventory.max_phonemes,
        config.inventory.max_patterns,
        config.reverser.max_cache_entries,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_words_per_batch,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
