//! User process model: a cursor over a finite program of sector operations,
//! plus the accounting the kernel maintains on its behalf.

use crate::workload::Step;

/// Scheduling state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Blocked,
    Finished,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "READY"),
            Self::Running => write!(f, "RUNNING"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

/// One simulated user process.
///
/// The process itself only owns its program cursor; every timing field is
/// advanced by the kernel.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: u32,
    pub name: String,
    program: Vec<Step>,
    cursor: usize,

    pub state: ProcessState,
    pub remaining_quantum: f64,
    /// Id of the disk request this process is blocked on, if any.
    pub in_flight: Option<u64>,

    pub cpu_time_ms: f64,
    pub io_time_ms: f64,
    pub wait_time_ms: f64,
    pub start_time: Option<f64>,
    pub finish_time: Option<f64>,
    pub ready_since: Option<f64>,
}

impl Process {
    pub fn new(pid: u32, name: impl Into<String>, program: Vec<Step>) -> Self {
        Self {
            pid,
            name: name.into(),
            program,
            cursor: 0,
            state: ProcessState::Ready,
            remaining_quantum: 0.0,
            in_flight: None,
            cpu_time_ms: 0.0,
            io_time_ms: 0.0,
            wait_time_ms: 0.0,
            start_time: None,
            finish_time: None,
            ready_since: None,
        }
    }

    /// Whether any program step remains.
    pub fn has_more(&self) -> bool {
        self.cursor < self.program.len()
    }

    /// Return the next step and advance the cursor.
    pub fn next_step(&mut self) -> Option<Step> {
        let step = self.program.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(step)
    }

    /// Completed fraction of the program, in percent.
    pub fn progress(&self) -> f64 {
        if self.program.is_empty() {
            100.0
        } else {
            self.cursor as f64 / self.program.len() as f64 * 100.0
        }
    }

    pub fn program(&self) -> &[Step] {
        &self.program
    }

    /// Return to the initial state for another run over the same program.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = ProcessState::Ready;
        self.remaining_quantum = 0.0;
        self.in_flight = None;
        self.cpu_time_ms = 0.0;
        self.io_time_ms = 0.0;
        self.wait_time_ms = 0.0;
        self.start_time = None;
        self.finish_time = None;
        self.ready_since = None;
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Process(pid={}, name={}, state={}, progress={:.1}%)",
            self.pid,
            self.name,
            self.state,
            self.progress()
        )
    }
}
