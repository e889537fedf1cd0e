pub mod config {
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Deserialize, Debug)]
    pub struct Config {
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_seed_file")]
        pub seed_file: PathBuf,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_seed_file() -> PathBuf {
        PathBuf::from("task.json")
    }

}

pub mod task;
pub mod web;
