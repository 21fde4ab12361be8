//! Simulation core and tick loop.
//!
//! `SimulationCore` owns the motor registry, the command queue and the
//! input-line bindings. Each tick it
//!
//! 1. fires scripted events that are due (producer side of the queue),
//! 2. drains up to `MAX_COMMANDS_PER_TICK` commands and dispatches them,
//! 3. steps every motor by the cycle time.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use motor_common::motor::{MotorConfig, MotorStatus};
use tracing::{debug, info, warn};

use crate::config::{EventAction, ScenarioEvent, SimulationConfig};
use crate::error::SimError;
use crate::io::IoBinding;
use crate::queue::{CommandQueue, CommandSender, QueuedCommand};
use crate::registry::MotorRegistry;
use crate::state::{PersistedState, StatePersistence};

/// Timing statistics for loop monitoring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of cycles executed
    pub cycle_count: u64,
    /// Number of timing violations (cycle exceeded target)
    pub timing_violations: u64,
    /// Maximum observed cycle time
    pub max_cycle_time_us: u64,
    /// Sum of cycle times for average calculation
    pub total_cycle_time_us: u64,
}

impl TimingStats {
    /// Average cycle time, zero before the first cycle.
    pub fn avg_cycle_time_us(&self) -> u64 {
        if self.cycle_count > 0 {
            self.total_cycle_time_us / self.cycle_count
        } else {
            0
        }
    }
}

/// Motor simulation core.
pub struct SimulationCore {
    /// Motors by name
    registry: MotorRegistry,
    /// Pending commands
    queue: CommandQueue,
    /// Input line subscriptions, one per motor
    bindings: Vec<IoBinding>,
    /// Scripted events not yet fired, by time
    events: VecDeque<ScenarioEvent>,
    /// State file, if configured
    persistence: Option<StatePersistence>,
    /// Running flag for loop control
    running: Arc<AtomicBool>,
    /// Tick length
    cycle_time: Duration,
    /// Simulated seconds elapsed
    sim_time: f64,
    /// Timing statistics
    stats: TimingStats,
}

impl std::fmt::Debug for SimulationCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationCore")
            .field("registry", &self.registry)
            .field("pending_events", &self.events.len())
            .field("cycle_time", &self.cycle_time)
            .field("sim_time", &self.sim_time)
            .finish()
    }
}

impl SimulationCore {
    /// Build every configured motor, bind its inputs and restore persisted
    /// state.
    ///
    /// # Errors
    /// Configuration validation or motor construction failure. A
    /// missing or unreadable state file is not an error.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;

        let cycle_time = Duration::from_micros(u64::from(config.cycle_time_us));
        let mut core = Self {
            registry: MotorRegistry::new(),
            queue: CommandQueue::new(),
            bindings: Vec::new(),
            events: config.sorted_events().into(),
            persistence: config.state_file.as_ref().map(StatePersistence::new),
            running: Arc::new(AtomicBool::new(false)),
            cycle_time,
            sim_time: 0.0,
            stats: TimingStats::default(),
        };

        for motor in &config.motors {
            core.add_motor(motor)?;
        }
        core.restore_state();

        info!(
            "SimulationCore created with {} motors, {} events, cycle_time={}us",
            core.registry.len(),
            core.events.len(),
            config.cycle_time_us
        );
        Ok(core)
    }

    /// Build, register and bind one motor.
    ///
    /// # Errors
    /// `InvalidConfiguration` or `DuplicateMotor`.
    pub fn add_motor(&mut self, config: &MotorConfig) -> Result<(), SimError> {
        self.registry.create(config)?;
        if let Some(motor) = self.registry.get(&config.name) {
            self.bindings
                .push(IoBinding::bind(motor, &self.queue.sender()));
        }
        Ok(())
    }

    /// Remove a motor and drop its input bindings.
    pub fn remove_motor(&mut self, name: &str) -> bool {
        self.bindings.retain(|binding| binding.motor() != name);
        self.registry.remove(name).is_some()
    }

    fn restore_state(&mut self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        match persistence.load() {
            Ok(Some(state)) => {
                let restored = state.apply(&mut self.registry);
                info!("Restored persisted state for {} motors", restored);
            }
            Ok(None) => {}
            // Non-fatal: start from the configured positions.
            Err(e) => warn!("Ignoring persisted state: {}", e),
        }
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns the number of commands applied this tick.
    pub fn step(&mut self, dt: f64) -> usize {
        self.fire_due_events();

        let batch = self.queue.drain();
        for queued in &batch {
            self.dispatch(queued);
        }

        for motor in self.registry.iter_mut() {
            motor.step(dt);
        }
        self.sim_time += dt;
        batch.len()
    }

    fn dispatch(&mut self, queued: &QueuedCommand) {
        let result = self
            .registry
            .require_mut(&queued.motor)
            .and_then(|motor| motor.apply(queued.command));
        match result {
            Ok(()) => debug!("'{}' <- {:?}", queued.motor, queued.command),
            Err(e) => warn!("Command {:?} for '{}' failed: {}", queued.command, queued.motor, e),
        }
    }

    fn fire_due_events(&mut self) {
        while self
            .events
            .front()
            .is_some_and(|event| event.at <= self.sim_time)
        {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            // Validated at construction.
            let Ok(action) = event.action() else {
                continue;
            };
            debug!("t={:.3}s event for '{}': {:?}", self.sim_time, event.motor, action);

            match action {
                EventAction::Command(command) => {
                    if let Err(e) = self
                        .queue
                        .sender()
                        .try_send(QueuedCommand::new(event.motor, command))
                    {
                        warn!("Scenario command dropped: {}", e);
                    }
                }
                EventAction::Signal(role, value) => {
                    let line = self
                        .registry
                        .get(&event.motor)
                        .and_then(|motor| motor.signals().get(role));
                    match line {
                        Some(line) => {
                            line.send(value);
                        }
                        None => warn!("Motor '{}' has no {} line", event.motor, role),
                    }
                }
            }
        }
    }

    // ─── Loop ───────────────────────────────────────────────────────

    /// Run ticks of the configured cycle time until `duration` simulated
    /// seconds have elapsed or the running flag is cleared.
    ///
    /// With `realtime` each tick sleeps out the rest of its cycle; otherwise
    /// the loop runs as fast as possible. `duration = None` runs until the
    /// flag is cleared.
    pub fn run(&mut self, duration: Option<f64>, realtime: bool) {
        let dt = self.cycle_time.as_secs_f64();
        let target_us = self.cycle_time.as_micros() as u64;
        info!(
            "Starting simulation loop (cycle_time={}us, realtime={}, duration={:?})",
            target_us, realtime, duration
        );
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            // Half a tick of slack absorbs accumulated rounding in sim_time.
            if duration.is_some_and(|limit| self.sim_time + 0.5 * dt > limit) {
                break;
            }

            let cycle_start = Instant::now();
            self.step(dt);

            let cycle_time_us = cycle_start.elapsed().as_micros() as u64;
            self.stats.cycle_count += 1;
            self.stats.total_cycle_time_us += cycle_time_us;
            self.stats.max_cycle_time_us = self.stats.max_cycle_time_us.max(cycle_time_us);

            if realtime {
                if cycle_time_us > target_us {
                    self.stats.timing_violations += 1;
                    if self.stats.timing_violations <= 10
                        || self.stats.timing_violations % 1000 == 0
                    {
                        warn!(
                            "Timing violation #{}: cycle took {}us (target {}us)",
                            self.stats.timing_violations, cycle_time_us, target_us
                        );
                    }
                }
                let elapsed = cycle_start.elapsed();
                if elapsed < self.cycle_time {
                    std::thread::sleep(self.cycle_time - elapsed);
                }
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Loop: {} cycles, avg={}us, max={}us, violations={}",
                    self.stats.cycle_count,
                    self.stats.avg_cycle_time_us(),
                    self.stats.max_cycle_time_us,
                    self.stats.timing_violations
                );
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(
            "Simulation loop stopped at t={:.3}s after {} cycles (violations: {})",
            self.sim_time, self.stats.cycle_count, self.stats.timing_violations
        );
    }

    /// Stop the loop and persist state.
    ///
    /// # Errors
    /// `PersistenceError` if the state file cannot be written.
    pub fn shutdown(&mut self) -> Result<(), SimError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        if let Some(persistence) = &self.persistence {
            persistence.save(&PersistedState::capture(&self.registry))?;
        }
        Ok(())
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Producer handle for host threads.
    pub fn sender(&self) -> CommandSender {
        self.queue.sender()
    }

    /// Motors.
    pub fn registry(&self) -> &MotorRegistry {
        &self.registry
    }

    /// Motors, mutable.
    pub fn registry_mut(&mut self) -> &mut MotorRegistry {
        &mut self.registry
    }

    /// Status of every motor in registration order.
    pub fn statuses(&self) -> Vec<MotorStatus> {
        self.registry.iter().map(|motor| motor.status()).collect()
    }

    /// Simulated seconds elapsed.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Tick length.
    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// Timing statistics.
    pub fn stats(&self) -> TimingStats {
        self.stats
    }

    /// Scripted events not yet fired.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}
