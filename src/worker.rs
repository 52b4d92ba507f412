use crate::error::SolverError;
use crate::model::{simulate, SimulationParams, VelocityField};
use crate::obstacles::ObstacleMap;

use std::{
    sync::mpsc::{self, TryRecvError},
    thread,
    time::{Duration, Instant},
};

pub enum Command {
    Solve(SimulationParams, ObstacleMap),
    Stop,
}

/// Result of one background solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub params: SimulationParams,
    pub result: Result<VelocityField, SolverError>,
    pub elapsed: Duration,
}

/// Handle to a thread that runs solver requests off the UI thread.
pub struct SolverHandle {
    command_sender: mpsc::Sender<Command>,
    outcome_receiver: mpsc::Receiver<SolveOutcome>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SolverHandle {
    pub fn spawn() -> Self {
        let (command_sender, command_receiver) = mpsc::channel();
        let (outcome_sender, outcome_receiver) = mpsc::channel();

        let thread = thread::spawn(move || {
            while let Ok(first) = command_receiver.recv() {
                // Only the most recent request is worth solving.
                let mut latest = first;
                for command in command_receiver.try_iter() {
                    latest = command;
                }

                let (params, obstacles) = match latest {
                    Command::Stop => break,
                    Command::Solve(params, obstacles) => (params, obstacles),
                };

                let start = Instant::now();
                let result = simulate(&params, &obstacles);
                let outcome = SolveOutcome {
                    params,
                    result,
                    elapsed: start.elapsed(),
                };
                log::debug!("solve finished in {:?}", outcome.elapsed);
                if outcome_sender.send(outcome).is_err() {
                    break;
                }
            }
            log::debug!("solver thread stopped");
        });

        Self {
            command_sender,
            outcome_receiver,
            thread: Some(thread),
        }
    }

    /// Queue a solve. Returns false if the solver thread is gone.
    pub fn request(&self, params: SimulationParams, obstacles: ObstacleMap) -> bool {
        self.command_sender
            .send(Command::Solve(params, obstacles))
            .is_ok()
    }

    /// The newest finished outcome, discarding older ones.
    pub fn latest_outcome(&self) -> Option<SolveOutcome> {
        let mut last_outcome = None;
        loop {
            match self.outcome_receiver.try_recv() {
                Ok(outcome) => last_outcome = Some(outcome),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        last_outcome
    }

    /// Block until the next outcome arrives.
    pub fn wait_outcome(&self, timeout: Duration) -> Option<SolveOutcome> {
        self.outcome_receiver.recv_timeout(timeout).ok()
    }

    pub fn stop(&mut self) {
        let _ = self.command_sender.send(Command::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("solver thread panicked");
            }
        }
    }
}

impl Drop for SolverHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_in_background() {
        let handle = SolverHandle::spawn();
        let params = SimulationParams {
            grid_size: 10,
            iterations: 2,
            ..Default::default()
        };
        let mut obstacles = ObstacleMap::empty(10);
        obstacles.paint(4, 4);
        assert!(handle.request(params, obstacles.clone()));

        let outcome = handle.wait_outcome(Duration::from_secs(30)).unwrap();
        assert_eq!(outcome.params, params);
        let field = outcome.result.unwrap();
        assert_eq!(field, simulate(&params, &obstacles).unwrap());
    }

    #[test]
    fn test_reports_solver_errors() {
        let handle = SolverHandle::spawn();
        let params = SimulationParams {
            grid_size: 6,
            iterations: 1,
            ..Default::default()
        };
        assert!(handle.request(params, ObstacleMap::empty(5)));
        let outcome = handle.wait_outcome(Duration::from_secs(30)).unwrap();
        assert!(matches!(
            outcome.result,
            Err(SolverError::ShapeMismatch { expected: 6, .. })
        ));
    }

    #[test]
    fn test_stop_joins_thread() {
        let mut handle = SolverHandle::spawn();
        handle.stop();
        assert!(handle.latest_outcome().is_none());
        assert!(!handle.request(SimulationParams::default(), ObstacleMap::empty(1)));
    }
}
