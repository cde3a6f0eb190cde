use std::env;
use std::path::PathBuf;

pub const HOME_VAR: &str = "DAYONE_VAULT_HOME";

fn fallback_dotenv_path(config_home: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = config_home {
        return Some(dir.join(".env"));
    }
    Some(home_dir?.join(".config/dayone-vault/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os(HOME_VAR).map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}
