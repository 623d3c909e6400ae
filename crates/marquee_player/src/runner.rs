// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame loop driving a built stage.

use crate::cue_sheet::{CueSheet, CueSheetError, PlayerSettings, Stage};
use indexmap::IndexMap;
use marquee_director::{ManualClock, PropertyMap, SystemClock};
use std::time::Duration;

/// Outcome of a playback run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Frames evaluated
    pub frames: u64,
    /// Final playback position in seconds
    pub position: f64,
    /// Final target values
    pub targets: IndexMap<String, PropertyMap>,
}

/// Build and play a cue sheet to completion
pub fn play(sheet: &CueSheet, settings: &PlayerSettings) -> Result<RunReport, CueSheetError> {
    settings.validate()?;

    let (mut stage, frames) = if settings.realtime {
        let mut stage = sheet.build(SystemClock::new())?;
        let until = settings.until.unwrap_or_else(|| stage.director.duration());
        let frames = run_realtime(&mut stage, settings.fps, until);
        (stage, frames)
    } else {
        let mut stage = sheet.build(ManualClock::new())?;
        let until = settings.until.unwrap_or_else(|| stage.director.duration());
        let frames = run_offline(&mut stage, settings.fps, until);
        (stage, frames)
    };

    let position = stage.director.position_seconds();
    stage.director.stop();

    Ok(RunReport {
        frames,
        position,
        targets: stage.snapshot(),
    })
}

/// Step frames as fast as possible until `until` seconds.
pub fn run_offline(stage: &mut Stage, fps: f64, until: f64) -> u64 {
    let director = &mut stage.director;
    director.set_fps(fps);
    director.start();

    let budget = (until * fps).ceil().max(0.0) as u64 + 1;
    let mut frames = 0;
    while frames < budget && director.position_seconds() < until {
        if !director.step_frame() {
            break;
        }
        frames += 1;
    }

    tracing::debug!("Offline run: {frames} frames, {:.3}s", director.position_seconds());
    frames
}

/// Follow the wall clock, sleeping one frame between updates, until `until` seconds.
pub fn run_realtime(stage: &mut Stage, fps: f64, until: f64) -> u64 {
    let director = &mut stage.director;
    let frame = Duration::from_secs_f64(1.0 / fps.max(1.0));
    director.start();

    let mut frames = 0;
    while director.position_seconds() < until {
        std::thread::sleep(frame);
        director.update();
        frames += 1;
    }

    tracing::debug!("Realtime run: {frames} frames, {:.3}s", director.position_seconds());
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"
CueSheet(
    name: "Fade",
    settings: (fps: 10.0),
    targets: {
        "panel": {"opacity": 0.0, "y": 0.0},
    },
    actions: [
        (at: 1.0, kind: Set(target: "panel", property: "y", value: 3.0)),
    ],
    tweens: [
        (at: Some(0.25), duration: 1.0, targets: Some(["panel"]), to: {"opacity": 1.0}, easing: Some("cubicInOut")),
    ],
)
"#;

    #[test]
    fn test_offline_play_reaches_end() {
        let sheet = CueSheet::from_ron_str(SHEET).unwrap();
        let report = play(&sheet, &sheet.settings).unwrap();

        assert!(report.frames >= 12 && report.frames <= 14, "frames = {}", report.frames);
        assert!(report.position >= 1.25);
        assert_eq!(report.targets["panel"]["opacity"], 1.0);
        assert_eq!(report.targets["panel"]["y"], 3.0);
    }

    #[test]
    fn test_until_cuts_playback_short() {
        let sheet = CueSheet::from_ron_str(SHEET).unwrap();
        let settings = PlayerSettings {
            until: Some(0.5),
            ..sheet.settings.clone()
        };
        let report = play(&sheet, &settings).unwrap();

        let opacity = report.targets["panel"]["opacity"];
        assert!(opacity > 0.0 && opacity < 0.5, "opacity = {opacity}");
        assert_eq!(report.targets["panel"]["y"], 0.0);
    }

    #[test]
    fn test_invalid_fps_fails_before_playing() {
        let sheet = CueSheet::from_ron_str(SHEET).unwrap();
        for fps in [0.0, -5.0, f64::NAN] {
            let settings = PlayerSettings {
                fps,
                ..sheet.settings.clone()
            };
            assert!(matches!(play(&sheet, &settings), Err(CueSheetError::InvalidFps(_))));
        }
    }

    #[test]
    fn test_realtime_play_reaches_until() {
        let sheet = CueSheet::from_ron_str(SHEET).unwrap();
        let settings = PlayerSettings {
            fps: 100.0,
            realtime: true,
            until: Some(0.05),
        };
        let report = play(&sheet, &settings).unwrap();

        assert!(report.frames >= 1);
        assert!(report.position >= 0.05, "position = {}", report.position);
        assert_eq!(report.targets["panel"]["opacity"], 0.0);
    }

    #[test]
    fn test_empty_sheet_plays_no_frames() {
        let sheet = CueSheet::from_ron_str(r#"CueSheet(name: "empty")"#).unwrap();
        let report = play(&sheet, &sheet.settings).unwrap();
        assert_eq!(report.frames, 0);
        assert!(report.targets.is_empty());
    }
}
