// 50 Hz control loop with an operator-command watchdog.
//
// The watchdog covers the gap between operator intent and the per-tick
// command re-assertion: if teleop dies and stops publishing, the effective
// command decays to the all-safe default (zero powers, launcher off, arm
// retracted) instead of the robot holding its last order forever.

use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::{info, warn};

use crate::config::{
    BUS_PORT, CMD_TIMEOUT, LOOP_HZ, TOPIC_CMD, TOPIC_HEALTH, TOPIC_READINESS, TOPIC_TELEMETRY,
    device_map,
};
use crate::control::TelemetrySink;
use crate::hardware::initialize_hardware;
use crate::messages::{OperatorCommand, ReadinessReport, RuntimeHealth};

pub struct Runtime {
    latest_cmd: Option<OperatorCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    /// Record an incoming operator command. Last write wins.
    fn on_command(&mut self, cmd: OperatorCommand) {
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = Instant::now();
    }

    /// The command the robot should act on this tick, with watchdog decay.
    fn effective_command(&mut self) -> OperatorCommand {
        let cmd_age = self.cmd_received_at.elapsed();

        if cmd_age > CMD_TIMEOUT {
            if self.health != RuntimeHealth::CmdStale {
                warn!("Command stale ({:?} old), decaying to safe default", cmd_age);
            }
            self.health = RuntimeHealth::CmdStale;
            OperatorCommand::default()
        } else if let Some(ref cmd) = self.latest_cmd {
            self.health = RuntimeHealth::Ok;
            cmd.clone()
        } else {
            self.health = RuntimeHealth::CmdStale;
            OperatorCommand::default()
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Telemetry sink that buffers one tick's label/value pairs for publication.
#[derive(Default)]
struct TelemetryBuffer {
    entries: Vec<(String, String)>,
}

impl TelemetrySink for TelemetryBuffer {
    fn put(&mut self, label: &str, value: String) {
        self.entries.push((label.to_string(), value));
    }
}

impl TelemetryBuffer {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD).await?;
    let pub_readiness = session.declare_publisher(TOPIC_READINESS).await?;
    let pub_telemetry = session.declare_publisher(TOPIC_TELEMETRY).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    // Fatal on any configuration error; no partial-hardware operation.
    let mut robot = initialize_hardware(BUS_PORT, &device_map())?;

    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        CMD_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}", TOPIC_CMD);
    info!(
        "Publishing to: {}, {}, {}",
        TOPIC_READINESS, TOPIC_TELEMETRY, TOPIC_HEALTH
    );

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<OperatorCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Apply intents for this tick (watchdog included)
        let cmd = runtime.effective_command();
        robot.set_launcher_enabled(cmd.spin_launcher);
        robot.set_arm_extended(cmd.extend_arm);
        robot.set_drive_power(cmd.drive_power);
        robot.set_intake_power(cmd.intake_power);
        robot.set_elevator_power(cmd.elevator_power);

        // 3. Run the control tick. A hardware fault here is fatal to the
        //    session; bubbling it up tears the loop down.
        let mut telemetry = TelemetryBuffer::default();
        robot.tick(&mut telemetry)?;

        // 4. Publish readiness, telemetry, health (fire-and-forget)
        let report = ReadinessReport {
            can_fire: robot.can_fire(),
            arm_in_position: robot.is_arm_in_position(),
            launcher_rpm: robot.launcher_rpm(),
        };
        pub_readiness.put(serde_json::to_string(&report)?).await?;
        pub_telemetry
            .put(telemetry.to_json().to_string())
            .await?;
        pub_health.put(serde_json::to_string(&runtime.health)?).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_yields_safe_default() {
        let mut runtime = Runtime::new();
        let cmd = runtime.effective_command();
        assert_eq!(cmd.drive_power, 0.0);
        assert!(!cmd.spin_launcher);
        assert!(!cmd.extend_arm);
        assert_eq!(runtime.health, RuntimeHealth::CmdStale);
    }

    #[test]
    fn test_fresh_command_passes_through() {
        let mut runtime = Runtime::new();
        runtime.on_command(OperatorCommand {
            spin_launcher: true,
            ..Default::default()
        });
        let cmd = runtime.effective_command();
        assert!(cmd.spin_launcher);
        assert_eq!(runtime.health, RuntimeHealth::Ok);
    }

    #[test]
    fn test_stale_command_decays_to_default() {
        let mut runtime = Runtime::new();
        runtime.on_command(OperatorCommand {
            spin_launcher: true,
            drive_power: 0.5,
            ..Default::default()
        });
        runtime.cmd_received_at = Instant::now()
            .checked_sub(CMD_TIMEOUT * 2)
            .expect("uptime shorter than watchdog window");

        let cmd = runtime.effective_command();
        assert!(!cmd.spin_launcher);
        assert_eq!(cmd.drive_power, 0.0);
        assert_eq!(runtime.health, RuntimeHealth::CmdStale);
    }
}
