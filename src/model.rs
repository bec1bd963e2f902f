use crate::alongside::AlongsideReport;

// Events sent from the detection thread to the main UI
pub enum DetectionEvent {
    // What the detection thread is doing right now
    Log(String),
    // Detection finished
    Done(AlongsideReport),
}
