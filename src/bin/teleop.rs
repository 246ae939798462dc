// Keyboard teleop: W/S drive, I/K intake, O/L elevator,
// SPACE toggle launcher, G toggle arm, R/F speed, Q quit
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ringbot_runtime::config::TOPIC_CMD;
use ringbot_runtime::messages::OperatorCommand;
use std::time::{Duration, Instant};
use tracing::info;

const DRIVE_SPEEDS: [f64; 3] = [0.25, 0.5, 1.0];
const INPUT_TIMEOUT_MS: u64 = 100; // Reset held powers after this much time with no input

#[derive(Parser, Debug)]
#[command(about = "Keyboard teleop publisher for the ringbot runtime")]
struct Args {
    /// Topic to publish operator commands on
    #[arg(long, default_value = TOPIC_CMD)]
    topic: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(args.topic.clone()).await?;

    info!("Controls: W/S=drive, I/K=intake, O/L=elevator, SPACE=launcher, G=arm, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;

    // Held powers reset on input timeout; toggles persist until re-pressed.
    let mut cmd = OperatorCommand::default();
    let mut last_power_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Held powers - refresh the timestamp
                    KeyCode::Char('w') if pressed => {
                        cmd.drive_power = DRIVE_SPEEDS[speed_idx];
                        last_power_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        cmd.drive_power = -DRIVE_SPEEDS[speed_idx];
                        last_power_input = Instant::now();
                    }
                    KeyCode::Char('i') if pressed => {
                        cmd.intake_power = 1.0;
                        last_power_input = Instant::now();
                    }
                    KeyCode::Char('k') if pressed => {
                        cmd.intake_power = -1.0;
                        last_power_input = Instant::now();
                    }
                    KeyCode::Char('o') if pressed => {
                        cmd.elevator_power = 1.0;
                        last_power_input = Instant::now();
                    }
                    KeyCode::Char('l') if pressed => {
                        cmd.elevator_power = -1.0;
                        last_power_input = Instant::now();
                    }

                    // Intent toggles
                    KeyCode::Char(' ') if pressed => {
                        cmd.spin_launcher = !cmd.spin_launcher;
                        info!("Launcher: {}", if cmd.spin_launcher { "ON" } else { "OFF" });
                    }
                    KeyCode::Char('g') if pressed => {
                        cmd.extend_arm = !cmd.extend_arm;
                        info!("Arm: {}", if cmd.extend_arm { "EXTENDED" } else { "RETRACTED" });
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset held powers if no input for INPUT_TIMEOUT_MS
        if last_power_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            cmd.drive_power = 0.0;
            cmd.intake_power = 0.0;
            cmd.elevator_power = 0.0;
        }

        // Always publish at ~50Hz
        publisher.put(serde_json::to_string(&cmd)?).await?;
    }

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
