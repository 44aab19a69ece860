use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub questions_file: PathBuf,
    pub quiz_duration_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("MEDQUIZ_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            questions_file: env::var("MEDQUIZ_QUESTIONS_FILE")
                .unwrap_or_else(|_| "questions_nodup.json".to_string())
                .into(),
            // 9000 seconds: the 2h30m quiz timer
            quiz_duration_secs: env::var("MEDQUIZ_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(9000),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            data_dir: PathBuf::from("./test-data"),
            questions_file: PathBuf::from("questions_nodup.json"),
            quiz_duration_secs: 60,
        }
    }
}
