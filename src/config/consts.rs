/// Fixed chunk size used when streaming objects into a workspace (32 KiB)
pub const FETCH_CHUNK_SIZE: usize = 32 * 1024;
/// Name of the shared input directory inside a job workspace
pub const INPUT_DIR_NAME: &str = "input";
/// Name of the directory holding per-workflow output directories
pub const OUTPUT_DIR_NAME: &str = "output";
/// Suffix of manifest objects excluded when `ignore_json` is set
pub const JSON_SUFFIX: &str = ".json";
/// Default configuration file, relative to the current directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
/// Default AMQP port
pub const DEFAULT_AMQP_PORT: u16 = 5672;
/// Default AMQP virtual host
pub const DEFAULT_VIRTUAL_HOST: &str = "/";
/// One unacknowledged delivery at a time
pub const DEFAULT_PREFETCH: u16 = 1;
/// Region reported to S3-compatible stores that ignore it (MinIO)
pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";
/// Default workflow runner executable
pub const DEFAULT_RUNNER_COMMAND: &str = "monai-deploy";
/// Consumer tag announced to the broker
pub const CONSUMER_TAG: &str = "workflow-dispatcher";
