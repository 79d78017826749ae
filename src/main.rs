//! chipvm: run a CHIP-8 or SUPER-CHIP ROM in a window, or headless for a fixed
//! number of cycles.
//!
//! ```bash
//! chipvm roms/ibm-logo.ch8
//! chipvm --variant schip --scale 8 roms/car.ch8
//! chipvm --headless --cycles 200 roms/ibm-logo.ch8
//! ```
//!
//! Set `RUST_LOG=trace` to log every executed instruction.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use chipvm::{Config, Emulator, Quirks, Variant, VmState};
use clap::{Parser, ValueEnum};
use minifb::Scale;

mod sound;
mod window;

use sound::Sound;
use window::Screen;

const TIMER_HZ: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    Chip8,
    Schip,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = 700, value_parser = clap::value_parser!(u32).range(1..))]
    ips: u32,

    /// Window zoom: 1, 2, 4, 8, 16 or 32
    #[arg(long, default_value = "16", value_parser = window::parse_scale)]
    scale: Scale,

    #[arg(long, value_enum, default_value_t = VariantArg::Chip8)]
    variant: VariantArg,

    /// Behave like the original COSMAC VIP interpreter (enables the shift,
    /// memory, logic and clip quirks)
    #[arg(long)]
    cosmac: bool,

    /// 8XY6/8XYE shift Vy into Vx
    #[arg(long)]
    shift_uses_vy: bool,

    /// FX55/FX65 advance I
    #[arg(long)]
    memory_increments_index: bool,

    /// BNNN jumps to XNN + Vx
    #[arg(long)]
    jump_with_vx: bool,

    /// 8XY1/8XY2/8XY3 reset VF
    #[arg(long)]
    logic_resets_vf: bool,

    /// Clip sprites at the screen edge instead of wrapping
    #[arg(long)]
    clip_sprites: bool,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Disable audio
    #[arg(long)]
    mute: bool,

    /// Run without a window and print the final screen
    #[arg(long)]
    headless: bool,

    /// Instructions to run in headless mode
    #[arg(long, default_value_t = 1000, requires = "headless")]
    cycles: u32,
}

impl Args {
    fn config(&self) -> Config {
        let base = if self.cosmac {
            Quirks::cosmac_vip()
        } else {
            Quirks::default()
        };
        let quirks = Quirks {
            shift_uses_vy: base.shift_uses_vy || self.shift_uses_vy,
            memory_increments_index: base.memory_increments_index
                || self.memory_increments_index,
            jump_with_vx: base.jump_with_vx || self.jump_with_vx,
            logic_resets_vf: base.logic_resets_vf || self.logic_resets_vf,
            clip_sprites: base.clip_sprites || self.clip_sprites,
        };
        let variant = match self.variant {
            VariantArg::Chip8 => Variant::Chip8,
            VariantArg::Schip => Variant::SuperChip,
        };
        Config {
            quirks,
            variant,
            seed: self.seed,
        }
    }

    fn steps_per_tick(&self) -> u32 {
        (self.ips / TIMER_HZ).max(1)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM {}", args.rom.display()))?;
    let emu = Emulator::load_with_config(&rom, args.config())
        .with_context(|| format!("failed to load ROM {}", args.rom.display()))?;
    log::info!("loaded {} ({} bytes)", args.rom.display(), rom.len());

    if args.headless {
        run_headless(emu, args.cycles, args.steps_per_tick())
    } else {
        run_window(emu, &args)
    }
}

fn run_headless(mut emu: Emulator, cycles: u32, steps_per_tick: u32) -> Result<()> {
    let mut fault = None;
    for cycle in 0..cycles {
        if cycle > 0 && cycle % steps_per_tick == 0 {
            emu.tick_60hz();
        }
        if let Err(err) = emu.step() {
            fault = Some(err);
            break;
        }
        if *emu.state() != VmState::Running {
            break;
        }
    }

    print!("{}", emu.framebuffer());
    println!("{}", summary(&emu));
    if let Some(err) = fault {
        bail!("program halted: {err}");
    }
    Ok(())
}

fn run_window(mut emu: Emulator, args: &Args) -> Result<()> {
    let mut screen = Screen::new(args.scale)?;
    let mut sound = sound::open(args.mute);
    let mut held = [false; 16];

    while screen.is_open() {
        let keys = screen.keypad();
        for (key, (&now, was)) in keys.iter().zip(held.iter()).enumerate() {
            if now != *was {
                emu.set_key(key as u8, now);
            }
        }
        held = keys;

        if !matches!(emu.state(), VmState::Halted(_)) {
            for _ in 0..args.steps_per_tick() {
                if let Err(err) = emu.step() {
                    log::error!("program halted: {err}");
                    break;
                }
            }
        }
        emu.tick_60hz();

        let beep = if emu.is_sound_playing() {
            sound.play()
        } else {
            sound.pause()
        };
        if let Err(err) = beep {
            log::warn!("{err:#}");
        }

        if emu.take_redraw() {
            screen.present(emu.framebuffer())?;
        } else {
            screen.update();
        }
    }
    Ok(())
}

fn summary(emu: &Emulator) -> String {
    let registers: Vec<String> = emu
        .registers()
        .iter()
        .enumerate()
        .map(|(n, v)| format!("V{n:X}={v:02X}"))
        .collect();
    format!(
        "PC={:#05X} I={:#05X} SP={} DT={} ST={}\n{}",
        emu.pc(),
        emu.index(),
        emu.stack_depth(),
        emu.delay_timer(),
        emu.sound_timer(),
        registers.join(" ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmac_preset_and_flags_combine() {
        let args = Args::parse_from(["chipvm", "--cosmac", "--jump-with-vx", "rom.ch8"]);
        let config = args.config();
        assert_eq!(
            config.quirks,
            Quirks {
                jump_with_vx: true,
                ..Quirks::cosmac_vip()
            }
        );
        assert_eq!(config.variant, Variant::Chip8);
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["chipvm", "--variant", "schip", "--seed", "7", "rom.ch8"]);
        assert_eq!(args.ips, 700);
        assert!(matches!(args.scale, Scale::X16));
        assert_eq!(args.steps_per_tick(), 11);
        let config = args.config();
        assert_eq!(config.variant, Variant::SuperChip);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.quirks, Quirks::default());
    }

    #[test]
    fn summary_lists_registers() {
        let emu = Emulator::load(&[0x6A, 0x42]).unwrap();
        let text = summary(&emu);
        assert!(text.starts_with("PC=0x200 I=0x000 SP=0"));
        assert!(text.contains("VA=00"));
    }
}
