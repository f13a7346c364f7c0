//! Terminal rendering of session status and frames.

use std::io::{self, Write};

use stormloop::session::{CurrentFrame, LoadingStatus};

/// Formats one playback frame as a single line.
pub fn format_frame(frame: &CurrentFrame, total: usize) -> String {
    let position = format!("[{:>3}/{}] {}", frame.index + 1, total, frame.descriptor.display_date);
    let Some(snapshot) = frame.snapshot.as_ref() else {
        return format!("{}  no data", position);
    };

    let mut names: Vec<&str> = snapshot.system_names().collect();
    names.dedup();
    let systems = if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    };

    format!(
        "{}  {} trajectories ({})  report: {}  overlays: {}",
        position,
        snapshot.trajectories.len(),
        systems,
        if snapshot.report.is_some() { "yes" } else { "no" },
        frame.descriptor.overlay_refs.len()
    )
}

/// Rewrites the progress line in place while loading.
pub fn print_status(status: &LoadingStatus) {
    let mut stdout = io::stdout();
    if status.is_loading() {
        let _ = write!(stdout, "\r{}", status);
    } else {
        let _ = writeln!(stdout, "\r{}", status);
    }
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stormloop::model::{LoadedSnapshot, SnapshotDescriptor};

    fn descriptor() -> SnapshotDescriptor {
        SnapshotDescriptor {
            timestamp: 1_705_000_000,
            display_date: "2024-01-11 19:06".to_string(),
            trajectory_refs: vec!["t.json".to_string()],
            report_ref: None,
            overlay_refs: vec![],
        }
    }

    #[test]
    fn test_frame_without_data() {
        let frame = CurrentFrame {
            index: 0,
            descriptor: descriptor(),
            snapshot: None,
        };

        assert_eq!(format_frame(&frame, 12), "[  1/12] 2024-01-11 19:06  no data");
    }

    #[test]
    fn test_frame_with_data() {
        let frame = CurrentFrame {
            index: 4,
            descriptor: descriptor(),
            snapshot: Some(Arc::new(LoadedSnapshot {
                timestamp: 1_705_000_000,
                display_date: "2024-01-11 19:06".to_string(),
                trajectories: vec![],
                report: None,
            })),
        };

        assert_eq!(
            format_frame(&frame, 12),
            "[  5/12] 2024-01-11 19:06  0 trajectories (-)  report: no  overlays: 0"
        );
    }
}
