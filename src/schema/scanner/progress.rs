use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

/// Number of files above which a progress bar is drawn
const MIN_ITEMS_FOR_BAR: usize = 10;

/// Progress tracker for displaying progress during scanning
#[derive(Debug, Default)]
pub struct ProgressTracker {
    enabled: bool,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Run `operation` on each path in order, stopping at the first error
    pub fn track_path_progress<F, E>(&self, paths: &[PathBuf], mut operation: F) -> Result<(), E>
    where
        F: FnMut(&PathBuf) -> Result<(), E>,
    {
        let progress_bar = if self.enabled && paths.len() > MIN_ITEMS_FOR_BAR {
            let pb = ProgressBar::new(paths.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        for (i, path) in paths.iter().enumerate() {
            if let Some(pb) = &progress_bar {
                pb.set_position(i as u64);
                if let Some(file_name) = path.file_name() {
                    pb.set_message(file_name.to_string_lossy().into_owned());
                }
            }

            if let Err(e) = operation(path) {
                if let Some(pb) = &progress_bar {
                    pb.abandon();
                }
                return Err(e);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Processing complete");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_at_first_error() {
        let paths: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("f{}.py", i))).collect();
        let mut seen = Vec::new();

        let result = ProgressTracker::new(false).track_path_progress(&paths, |path| {
            seen.push(path.clone());
            if seen.len() == 3 { Err("boom") } else { Ok(()) }
        });

        assert_eq!(result, Err("boom"));
        assert_eq!(seen.len(), 3);
    }
}
