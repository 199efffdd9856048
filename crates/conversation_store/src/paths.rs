use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".cog";
pub const DATABASE_FILE: &str = "conversations.db";

#[must_use]
pub fn default_database_path(home: &Path) -> PathBuf {
    home.join(DATA_DIR).join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_lives_under_home_data_dir() {
        assert_eq!(
            default_database_path(Path::new("/home/ada")),
            PathBuf::from("/home/ada/.cog/conversations.db")
        );
    }
}
