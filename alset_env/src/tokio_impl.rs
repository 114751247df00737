//! Live implementations of the environment traits using Tokio.

use crate::error::EnvError;
use crate::input::InputSource;
use crate::pacer::{TickPacer, DEFAULT_TICK_INTERVAL};
use crate::types::{EnvironmentOverride, InputEvent, TickInputs, VehicleCommand};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Production pacer backed by the tokio timer.
pub struct TokioPacer {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Spacing between ticks
    interval: Duration,
}

impl TokioPacer {
    /// Creates a pacer with the given tick spacing.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
        }
    }
}

impl Default for TokioPacer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[async_trait]
impl TickPacer for TokioPacer {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    async fn wait_next_tick(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Producer handle for a [`ChannelInput`].
///
/// Cheap to clone; every clone feeds the same single consumer.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl InputSender {
    /// Queues an event for a later tick.
    pub fn send(&self, event: InputEvent) -> Result<(), EnvError> {
        self.tx.send(event).map_err(|_| EnvError::QueueClosed)
    }

    /// Queues an environment override.
    pub fn send_override(&self, o: EnvironmentOverride) -> Result<(), EnvError> {
        self.send(InputEvent::Environment(o))
    }

    /// Queues a vehicle command.
    pub fn send_command(&self, c: VehicleCommand) -> Result<(), EnvError> {
        self.send(InputEvent::Vehicle(c))
    }
}

/// Live input queue: many producers, the control loop as sole consumer.
pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,

    /// Events received but not yet applied (their class slot was taken)
    backlog: VecDeque<InputEvent>,

    /// All senders are gone
    closed: bool,
}

impl ChannelInput {
    /// Creates a queue and its first producer handle.
    pub fn channel() -> (InputSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let input = Self {
            rx,
            backlog: VecDeque::new(),
            closed: false,
        };
        (InputSender { tx }, input)
    }

    /// Returns the number of events waiting for a later tick.
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self, tick: u64) -> TickInputs {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.backlog.push_back(event),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if !self.closed {
                        tracing::debug!("input queue closed at tick {}", tick);
                    }
                    self.closed = true;
                    break;
                }
            }
        }

        TickInputs::take_from(&mut self.backlog)
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.backlog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gear;

    #[tokio::test]
    async fn test_tokio_pacer_time() {
        let pacer = TokioPacer::new(Duration::from_millis(10));
        let t1 = pacer.now();
        pacer.wait_next_tick().await;
        let t2 = pacer.now();

        assert!(t2 - t1 >= Duration::from_millis(10));
        assert_eq!(pacer.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_tokio_pacer_default_interval() {
        let pacer = TokioPacer::default();
        assert_eq!(pacer.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[tokio::test]
    async fn test_channel_input_one_per_class() {
        let (tx, mut input) = ChannelInput::channel();
        let tx2 = tx.clone();

        tx.send_command(VehicleCommand::AccelerateTo(70.0)).unwrap();
        tx2.send_command(VehicleCommand::SetGear(Gear::Park)).unwrap();
        tx.send_override(EnvironmentOverride::Rain(true)).unwrap();

        let first = input.poll(0);
        assert_eq!(first.command, Some(VehicleCommand::AccelerateTo(70.0)));
        assert_eq!(first.environment, Some(EnvironmentOverride::Rain(true)));
        assert_eq!(input.backlog_len(), 1);

        let second = input.poll(1);
        assert_eq!(second.command, Some(VehicleCommand::SetGear(Gear::Park)));
        assert!(second.environment.is_none());
    }

    #[tokio::test]
    async fn test_channel_input_exhausted_after_senders_drop() {
        let (tx, mut input) = ChannelInput::channel();
        tx.send_override(EnvironmentOverride::Reset).unwrap();
        drop(tx);

        assert!(!input.is_exhausted());
        let inputs = input.poll(0);
        assert_eq!(inputs.environment, Some(EnvironmentOverride::Reset));
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_send_after_close_fails() {
        let (tx, input) = ChannelInput::channel();
        drop(input);

        let result = tx.send_command(VehicleCommand::Reset);
        assert!(matches!(result, Err(EnvError::QueueClosed)));
    }
}
