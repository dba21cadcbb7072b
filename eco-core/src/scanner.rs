use std::time::Duration;

use eco_types::{
    DEFAULT_COLOR, DEFAULT_MATERIAL, DEFAULT_SIZE, DetectionRecord, DetectionResult, ScanError,
    ScanOutcome, ScanPhase, ScanProgress,
};
use tracing::{debug, info, warn};

use crate::{BottleDetector, CapturedImage, EcoConfig, LedgerStorage, LedgerStore};

/// Progress marks of the scan animation and the label shown until each is
/// reached.
pub const SCAN_STEPS: [(f64, &str); 7] = [
    (10.0, "Initializing scanner..."),
    (25.0, "Loading AI model..."),
    (40.0, "Capturing image..."),
    (60.0, "Analyzing bottle..."),
    (80.0, "Identifying type and size..."),
    (95.0, "Finalizing detection..."),
    (100.0, "Scan complete!"),
];

/// A box taller than this share of the frame is read as a large bottle.
const LARGE_BOTTLE_HEIGHT: f64 = 0.5;
const LARGE_BOTTLE_SIZE: &str = "500 ml";

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub analysis_threshold: f64,
    pub detection_timeout: Duration,
    pub fallback_confidence: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::from(&EcoConfig::default())
    }
}

impl From<&EcoConfig> for ScanConfig {
    fn from(config: &EcoConfig) -> Self {
        Self {
            analysis_threshold: config.analysis_threshold,
            detection_timeout: config.detection_timeout,
            fallback_confidence: config.fallback_confidence,
        }
    }
}

pub fn step_label(progress: f64) -> &'static str {
    SCAN_STEPS
        .iter()
        .find(|(mark, _)| *mark > progress)
        .or(SCAN_STEPS.last())
        .map(|(_, label)| *label)
        .unwrap_or_default()
}

/// The outcome used when no usable detection is available.
pub fn fallback_outcome(confidence: u8) -> ScanOutcome {
    ScanOutcome {
        bottles: 1,
        size: DEFAULT_SIZE.to_string(),
        color: DEFAULT_COLOR.to_string(),
        material: DEFAULT_MATERIAL.to_string(),
        confidence,
        from_fallback: true,
    }
}

/// Turn a raw detector answer into something the reward popup can show.
pub fn outcome_from_result(result: &DetectionResult) -> ScanOutcome {
    let confidence = (result.confidence * 100.0).round().clamp(0.0, 100.0) as u8;

    if result.bottle_count == 0 {
        return fallback_outcome(confidence);
    }

    let size = match &result.size_hint {
        Some(size) => size.clone(),
        None => match result.bounding_boxes.first() {
            Some(bbox) if bbox.height > LARGE_BOTTLE_HEIGHT => LARGE_BOTTLE_SIZE.to_string(),
            _ => DEFAULT_SIZE.to_string(),
        },
    };

    ScanOutcome {
        bottles: result.bottle_count,
        size,
        color: DEFAULT_COLOR.to_string(),
        material: result
            .material_hint
            .clone()
            .unwrap_or_else(|| DEFAULT_MATERIAL.to_string()),
        confidence,
        from_fallback: false,
    }
}

/// One pass through the scan screen.
#[derive(Debug, Clone)]
pub struct ScanSession {
    config: ScanConfig,
    phase: ScanPhase,
    progress: f64,
    outcome: Option<ScanOutcome>,
    recorded: bool,
}

impl ScanSession {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            phase: ScanPhase::Idle,
            progress: 0.0,
            outcome: None,
            recorded: false,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            phase: self.phase,
            progress: self.progress,
            step: step_label(self.progress).to_string(),
        }
    }

    fn transition(&mut self, to: ScanPhase) {
        debug!("Scan phase {:?} -> {:?}", self.phase, to);
        self.phase = to;
    }

    fn invalid(&self, action: &str) -> ScanError {
        ScanError::InvalidTransition {
            phase: self.phase,
            action: action.to_string(),
        }
    }

    pub fn start(&mut self) -> Result<(), ScanError> {
        if self.phase != ScanPhase::Idle {
            return Err(self.invalid("start"));
        }
        self.progress = 0.0;
        self.transition(ScanPhase::Scanning);
        Ok(())
    }

    /// Move the progress animation forward. Crossing the analysis threshold
    /// captures the frame and hands over to detection.
    pub fn advance(&mut self, delta: f64) -> Result<ScanPhase, ScanError> {
        if !matches!(self.phase, ScanPhase::Scanning | ScanPhase::Analyzing) {
            return Err(self.invalid("advance"));
        }

        self.progress = (self.progress + delta.max(0.0)).min(100.0);
        if self.phase == ScanPhase::Scanning && self.progress >= self.config.analysis_threshold {
            self.transition(ScanPhase::Analyzing);
        }
        Ok(self.phase)
    }

    /// A detection came back before the timer.
    pub fn complete(&mut self, outcome: ScanOutcome) -> Result<(), ScanError> {
        if self.phase != ScanPhase::Analyzing {
            return Err(self.invalid("complete"));
        }

        info!(
            "Scan complete: {} bottles at {}% confidence",
            outcome.bottles, outcome.confidence
        );
        self.progress = 100.0;
        self.outcome = Some(outcome);
        self.transition(ScanPhase::Complete);
        Ok(())
    }

    /// The analysis timer ran out with no detection; settle on the fallback.
    pub fn timer_elapsed(&mut self) -> Result<(), ScanError> {
        if self.phase != ScanPhase::Analyzing {
            return Err(self.invalid("finish analysis"));
        }

        warn!("No detection before the scan timer elapsed, using fallback");
        self.complete(fallback_outcome(self.config.fallback_confidence))
    }

    pub fn show_reward(&mut self) -> Result<(), ScanError> {
        if self.phase != ScanPhase::Complete {
            return Err(self.invalid("show reward"));
        }
        self.transition(ScanPhase::RewardShown);
        Ok(())
    }

    /// Append the outcome to the ledger. Only the first call appends.
    pub async fn commit<S: LedgerStorage>(
        &mut self,
        ledger: &mut LedgerStore<S>,
    ) -> Result<DetectionRecord, ScanError> {
        if self.recorded {
            return Err(ScanError::AlreadyRecorded);
        }
        if !matches!(self.phase, ScanPhase::Complete | ScanPhase::RewardShown) {
            return Err(self.invalid("commit"));
        }
        let Some(outcome) = self.outcome.as_ref() else {
            return Err(self.invalid("commit"));
        };

        let detection = outcome.to_new_detection();
        self.recorded = true;
        self.transition(ScanPhase::Recorded);

        Ok(ledger.add_detection(detection).await)
    }

    /// Drop the scan without touching the ledger.
    pub fn discard(&mut self) -> Result<(), ScanError> {
        if matches!(self.phase, ScanPhase::Idle) || self.phase.is_terminal() {
            return Err(self.invalid("discard"));
        }
        self.transition(ScanPhase::Discarded);
        Ok(())
    }

    /// Back to Idle for another scan.
    pub fn reset(&mut self) -> Result<(), ScanError> {
        if !self.phase.is_terminal() {
            return Err(self.invalid("reset"));
        }
        self.progress = 0.0;
        self.outcome = None;
        self.recorded = false;
        self.transition(ScanPhase::Idle);
        Ok(())
    }
}

/// Runs scans against a detector with a bounded wait.
pub struct Scanner<D: BottleDetector> {
    detector: D,
    config: ScanConfig,
}

impl<D: BottleDetector> Scanner<D> {
    pub fn new(detector: D, config: ScanConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn session(&self) -> ScanSession {
        ScanSession::new(self.config.clone())
    }

    /// Ask the detector about `image`. Never fails: errors and timeouts
    /// produce the fallback outcome.
    pub async fn detect(&self, image: &CapturedImage) -> ScanOutcome {
        let fallback = || fallback_outcome(self.config.fallback_confidence);

        match tokio::time::timeout(self.config.detection_timeout, self.detector.detect(image)).await
        {
            Ok(Ok(result)) => {
                let outcome = outcome_from_result(&result);
                if outcome.from_fallback {
                    warn!("Detector found no bottles, using fallback shape");
                }
                outcome
            }
            Ok(Err(e)) => {
                warn!("Detection failed: {}. Using fallback", e);
                fallback()
            }
            Err(_) => {
                warn!(
                    "Detection timed out after {:?}. Using fallback",
                    self.config.detection_timeout
                );
                fallback()
            }
        }
    }

    /// Drive `session` from Idle (or an in-flight scan) to Complete. With no
    /// image the analysis timer is treated as elapsed.
    pub async fn run(
        &self,
        session: &mut ScanSession,
        image: Option<&CapturedImage>,
    ) -> Result<ScanOutcome, ScanError> {
        if session.phase() == ScanPhase::Idle {
            session.start()?;
        }
        if session.phase() == ScanPhase::Scanning {
            let remaining = self.config.analysis_threshold - session.progress;
            session.advance(remaining)?;
        }

        match image {
            Some(image) => {
                let outcome = self.detect(image).await;
                session.complete(outcome.clone())?;
                Ok(outcome)
            }
            None => {
                session.timer_elapsed()?;
                session
                    .outcome()
                    .cloned()
                    .ok_or_else(|| session.invalid("finish analysis"))
            }
        }
    }
}
