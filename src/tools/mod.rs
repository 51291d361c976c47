mod ffprobe_info;
mod number;
mod path_validator;
mod tool_check;
mod tool_runner;

pub use ffprobe_info::{FfprobeInspector, InspectionError, MediaInspector, StreamMetadata};
pub use number::{is_plain_number, parse_seconds};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use tool_check::{ToolInfo, check_tool, check_tools, has_vidstab_filters};
pub use tool_runner::{CommandLine, ProcessRunner, RunError, ToolOutput, ToolRunner};
