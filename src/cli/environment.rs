use std::path::{Path, PathBuf};

/// Writable scratch directory available inside an AWS Lambda sandbox.
pub const LAMBDA_OUTPUT_DIRECTORY: &str = "/tmp";

/**
 * Where the renderer is running. Inside AWS Lambda only `/tmp` is writable, so
 * output files are redirected there.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEnvironment {
    Local,
    Lambda {
        function_name: String,
        memory_size: String,
        region: Option<String>,
    },
}

impl ExecutionEnvironment {
    /**
     * Lambda is detected when both `AWS_LAMBDA_FUNCTION_NAME` and
     * `AWS_LAMBDA_FUNCTION_MEMORY_SIZE` are set to non-empty values.
     */
    pub fn detect_from<L>(lookup: L) -> ExecutionEnvironment
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        match (
            non_empty("AWS_LAMBDA_FUNCTION_NAME"),
            non_empty("AWS_LAMBDA_FUNCTION_MEMORY_SIZE"),
        ) {
            (Some(function_name), Some(memory_size)) => ExecutionEnvironment::Lambda {
                function_name,
                memory_size,
                region: non_empty("AWS_REGION"),
            },
            _ => ExecutionEnvironment::Local,
        }
    }

    pub fn detect() -> ExecutionEnvironment {
        let environment = Self::detect_from(crate::core::config::process_env);
        environment.log();
        environment
    }

    pub fn log(&self) {
        match self {
            ExecutionEnvironment::Local => log::info!("Running in a local environment"),
            ExecutionEnvironment::Lambda {
                function_name,
                memory_size,
                region,
            } => log::info!(
                "Running in AWS Lambda: function `{}`, {} MB, region {}",
                function_name,
                memory_size,
                region.as_deref().unwrap_or("unknown")
            ),
        }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, ExecutionEnvironment::Lambda { .. })
    }

    /// Output location for `file_name`: unchanged locally, moved into `/tmp` on Lambda.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        match self {
            ExecutionEnvironment::Local => PathBuf::from(file_name),
            ExecutionEnvironment::Lambda { .. } => {
                let name = Path::new(file_name)
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(file_name));
                Path::new(LAMBDA_OUTPUT_DIRECTORY).join(name)
            }
        }
    }
}
