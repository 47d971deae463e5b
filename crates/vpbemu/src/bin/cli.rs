use clap::Parser;
use std::io::Write;
use tracing::info;
use vpbemu::{Args, EmulatorCore, StopReason, load_image_data};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load image data
    let image_data = match load_image_data(&args) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to load image: {}", e);
            std::process::exit(2);
        }
    };

    // Create emulator config from args
    let config = args.to_emulator_config();

    // Create emulator
    info!("=== Creating Emulator ===");
    let mut emulator = match EmulatorCore::new(&image_data, config) {
        Ok(emu) => emu,
        Err(e) => {
            eprintln!("Failed to create emulator: {}", e);
            std::process::exit(2);
        }
    };

    info!("Entry: {:#X}", emulator.pc());

    // Run emulator
    info!("=== Running Emulator (Headless) ===");
    let stop_reason = emulator.run();

    // Log final state
    info!("=== Emulation Complete ===");
    info!("Stop reason: {:?}", stop_reason);
    emulator.print_final_state();

    // Determine exit code based on stop reason and whether expectations were met
    let exit_code = match stop_reason {
        StopReason::Error(msg) => {
            eprintln!("Emulator error: {}", msg);
            2
        }
        StopReason::Timeout => {
            eprintln!("Timeout reached before stop conditions met");
            1
        }
        StopReason::Halted(pc) => {
            eprintln!("Firmware halted at {:#X}", pc);
            1
        }
        StopReason::StopCondition => {
            let toggles_ok = args
                .expect_toggles
                .is_none_or(|expected| emulator.output_toggles() >= expected);
            let pc_ok = args
                .stop_pc
                .is_none_or(|expected| emulator.stopped() && emulator.pc() == expected);

            if toggles_ok && pc_ok {
                info!("PASS: All stop conditions reached");
                0
            } else {
                // max_instructions was hit first
                if let Some(expected) = args.expect_toggles.filter(|_| !toggles_ok) {
                    eprintln!(
                        "Output pin toggled {} times, expected {}",
                        emulator.output_toggles(),
                        expected
                    );
                }
                if let Some(expected) = args.stop_pc.filter(|_| !pc_ok) {
                    eprintln!(
                        "Core did not reach expected PC {:#X} (actual: {:#X}, stopped: {})",
                        expected,
                        emulator.pc(),
                        emulator.stopped()
                    );
                }
                1
            }
        }
    };

    // Echo what the firmware printed
    print!("{}", emulator.serial_output());
    let _ = std::io::stdout().flush();

    std::process::exit(exit_code);
}
