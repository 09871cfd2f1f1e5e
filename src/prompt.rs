use std::env;
use std::path::Path;

/// Fixed text shown after the directory part of the prompt.
pub const SHELL_SUFFIX: &str = "3sh> ";

/// Prompt for a shell sitting in `cwd`.
///
/// `~` for the home directory, `/` for the root, otherwise the last path
/// component.
pub fn render(cwd: &Path, home: &Path) -> String {
    let place = if cwd == home {
        "~".to_string()
    } else if cwd == Path::new("/") {
        "/".to_string()
    } else {
        cwd.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| cwd.display().to_string())
    };
    format!("{place} {SHELL_SUFFIX}")
}

/// Prompt for the process's current working directory.
pub fn current(home: &Path) -> String {
    match env::current_dir() {
        Ok(cwd) => render(&cwd, home),
        Err(_) => format!("? {SHELL_SUFFIX}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_is_tilde() {
        assert_eq!(render(Path::new("/home/ann"), Path::new("/home/ann")), "~ 3sh> ");
    }

    #[test]
    fn test_root_is_slash() {
        assert_eq!(render(Path::new("/"), Path::new("/home/ann")), "/ 3sh> ");
    }

    #[test]
    fn test_other_directories_show_last_component() {
        assert_eq!(render(Path::new("/home/ann/src/3sh"), Path::new("/home/ann")), "3sh 3sh> ");
        assert_eq!(render(Path::new("/usr"), Path::new("/home/ann")), "usr 3sh> ");
    }

    #[test]
    fn test_home_at_root_prefers_tilde() {
        assert_eq!(render(Path::new("/"), Path::new("/")), "~ 3sh> ");
    }
}
