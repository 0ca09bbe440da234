use crate::render::OutputFormat;
use crate::service::RenderRequest;
use crate::users::UserListPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hubconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the hub configuration and write it out
    Render {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate the inputs without writing a configuration
    Check {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Directory holding the imagelist and userlist files
    #[arg(long, value_name = "DIRECTORY", default_value = ".")]
    pub config_dir: PathBuf,

    /// Image list path (defaults to <config-dir>/imagelist)
    #[arg(long, value_name = "FILE")]
    pub image_list: Option<PathBuf>,

    /// User list path (defaults to <config-dir>/userlist)
    #[arg(long, value_name = "FILE")]
    pub user_list: Option<PathBuf>,

    /// Dotenv file merged under the process environment
    #[arg(long, value_name = "FILE", env = "HUBCONF_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// hubconf settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// What to do when the user list cannot be read
    #[arg(long, value_enum)]
    pub user_list_policy: Option<UserListPolicy>,
}

impl InputArgs {
    pub fn into_request(self) -> RenderRequest {
        RenderRequest {
            config_dir: self.config_dir,
            image_list: self.image_list,
            user_list: self.user_list,
            env_file: self.env_file,
            settings: self.settings,
            user_list_policy: self.user_list_policy,
            ..Default::default()
        }
    }
}
