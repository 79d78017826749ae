use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    config::{Config, Variant},
    decode::OpCodes,
    display::FrameBuffer,
    error::{ExecError, LoadError},
    keyboard::Keyboard,
    memory::{
        Memory, TypeAddr, ADDR_MASK, BIG_FONT_ADDR, BIG_FONT_GLYPH_LEN, FONT_ADDR,
        FONT_GLYPH_LEN,
    },
    registers::{Registers, FLAG},
    timer::Timer,
};

/// Where the VM is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmState {
    Uninitialized,
    Loaded,
    Running,
    /// FX0A is waiting; the next key press lands in this register.
    WaitingForKey { register: u8 },
    Halted(Halt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// Stopped by the host or by a SUPER-CHIP `EXIT`.
    Stopped,
    Fault(ExecError),
}

// What happens to the program counter once an instruction has run.
enum Next {
    Advance,
    SkipIf(bool),
    Jump(TypeAddr),
}

/// An owned CHIP-8 machine. Instructions only run through [`Emulator::step`],
/// so every fault goes through the halt bookkeeping:
///
/// ```compile_fail
/// use chipvm::{Emulator, OpCodes};
///
/// let mut emu = Emulator::load(&[0x60, 0x01]).unwrap();
/// emu.execute_ins(OpCodes::PopSubroutine).unwrap();
/// ```
pub struct Emulator {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    delay_timer: Timer,
    sound_timer: Timer,
    keyboard: Keyboard,
    rpl_flags: [u8; 8],
    config: Config,
    rng: StdRng,
    state: VmState,
    rom: Vec<u8>,
    redraw: bool,
}

impl Emulator {
    pub fn with_config(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            keyboard: Keyboard::new(),
            rpl_flags: [0; 8],
            config,
            rng,
            state: VmState::Uninitialized,
            rom: Vec::new(),
            redraw: false,
        }
    }

    /// Builds a VM with the default dialect and loads `rom` into it.
    pub fn load(rom: &[u8]) -> Result<Self, LoadError> {
        Self::load_with_config(rom, Config::default())
    }

    pub fn load_with_config(rom: &[u8], config: Config) -> Result<Self, LoadError> {
        let mut emu = Self::with_config(config);
        emu.load_rom(rom)?;
        Ok(emu)
    }

    /// Replaces the current program. On error the VM is left as it was.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.mem.load_rom(rom)?;
        self.rom = rom.to_vec();
        self.reinitialise();
        log::debug!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    /// Restarts the last loaded program from a clean machine.
    pub fn reset(&mut self) {
        if self.state == VmState::Uninitialized {
            return;
        }
        self.mem = Memory::new();
        self.mem.write_program(&self.rom);
        self.reinitialise();
        log::debug!("reset");
    }

    fn reinitialise(&mut self) {
        self.regs = Registers::new();
        self.delay_timer = Timer::default();
        self.sound_timer = Timer::default();
        self.keyboard.reset();
        self.fb = FrameBuffer::new();
        self.rpl_flags = [0; 8];
        self.state = VmState::Loaded;
        self.redraw = true;
    }

    /// Halts the VM; further steps do nothing.
    pub fn stop(&mut self) {
        if self.state != VmState::Uninitialized {
            self.state = VmState::Halted(Halt::Stopped);
        }
    }

    /// Runs one fetch-decode-execute cycle.
    ///
    /// A no-op while waiting for a key or after a stop. A fault halts the VM
    /// and is returned again by every later call.
    pub fn step(&mut self) -> Result<(), ExecError> {
        match &self.state {
            VmState::Uninitialized => return Err(ExecError::NotLoaded),
            VmState::WaitingForKey { .. } | VmState::Halted(Halt::Stopped) => return Ok(()),
            VmState::Halted(Halt::Fault(err)) => return Err(err.clone()),
            VmState::Loaded | VmState::Running => {}
        }
        self.state = VmState::Running;

        let result = self
            .fetch_decode()
            .and_then(|operation| self.execute_ins(operation));
        if let Err(err) = &result {
            log::warn!("halting: {err}");
            self.state = VmState::Halted(Halt::Fault(err.clone()));
        }
        result
    }

    fn fetch_decode(&self) -> Result<OpCodes, ExecError> {
        let pc = self.mem.pc.0;
        let ins = self.mem.word_at(pc).ok_or(ExecError::OutOfBounds { pc })?;
        let invalid = ExecError::InvalidOpcode { opcode: ins, pc };
        let operation = OpCodes::decode_raw(ins).ok_or_else(|| invalid.clone())?;
        if operation.is_super_chip() && self.config.variant != Variant::SuperChip {
            return Err(invalid);
        }
        log::trace!("{pc:#05X}: {ins:04X} {operation}");
        Ok(operation)
    }

    // Errors are raised before anything is written.
    fn execute_ins(&mut self, ins: OpCodes) -> Result<(), ExecError> {
        let pc = self.mem.pc.0;
        let quirks = self.config.quirks;

        let next = match ins {
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
                self.redraw = true;
                Next::Advance
            }
            OpCodes::PopSubroutine => {
                let addr = self
                    .mem
                    .stack
                    .pop()
                    .map_err(|_| ExecError::StackUnderflow { pc })?;
                Next::Jump(addr)
            }
            OpCodes::Jump(addr) => Next::Jump(addr),
            OpCodes::PushSubroutine(addr) => {
                // return to the instruction after the call
                self.mem
                    .stack
                    .push(pc.wrapping_add(2))
                    .map_err(|_| ExecError::StackOverflow { pc })?;
                Next::Jump(addr)
            }
            OpCodes::SkipEqualConstant(vx, nn) => Next::SkipIf(self.regs.get(vx) == nn),
            OpCodes::SkipNotEqualConstant(vx, nn) => Next::SkipIf(self.regs.get(vx) != nn),
            OpCodes::SkipEqualRegister(vx, vy) => {
                Next::SkipIf(self.regs.get(vx) == self.regs.get(vy))
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                Next::SkipIf(self.regs.get(vx) != self.regs.get(vy))
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
                Next::Advance
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
                Next::Advance
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
                Next::Advance
            }
            OpCodes::Or(vx, vy) => {
                self.logic(vx, self.regs.get(vx) | self.regs.get(vy));
                Next::Advance
            }
            OpCodes::And(vx, vy) => {
                self.logic(vx, self.regs.get(vx) & self.regs.get(vy));
                Next::Advance
            }
            OpCodes::XOr(vx, vy) => {
                self.logic(vx, self.regs.get(vx) ^ self.regs.get(vy));
                Next::Advance
            }
            OpCodes::Add(vx, vy) => {
                let (z, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_with_flag(vx, z, carry);
                Next::Advance
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (z, borrow) = self.regs.get(vx).overflowing_sub(self.regs.get(vy));
                self.regs.set_with_flag(vx, z, !borrow);
                Next::Advance
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (z, borrow) = self.regs.get(vy).overflowing_sub(self.regs.get(vx));
                self.regs.set_with_flag(vx, z, !borrow);
                Next::Advance
            }
            OpCodes::RightShift(vx, vy) => {
                let value = self.regs.get(if quirks.shift_uses_vy { vy } else { vx });
                self.regs.set_with_flag(vx, value >> 1, value & 1 == 1);
                Next::Advance
            }
            OpCodes::LeftShift(vx, vy) => {
                let value = self.regs.get(if quirks.shift_uses_vy { vy } else { vx });
                self.regs.set_with_flag(vx, value << 1, value & 0x80 != 0);
                Next::Advance
            }
            OpCodes::SetIndexRegister(addr) => {
                self.mem.index.set_addr(addr);
                Next::Advance
            }
            OpCodes::JumpWithOffset(vx, addr) => {
                let offset = self.regs.get(if quirks.jump_with_vx { vx } else { 0 });
                Next::Jump((addr + offset as TypeAddr) & ADDR_MASK)
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
                Next::Advance
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                self.draw(reg_x, reg_y, height);
                Next::Advance
            }
            OpCodes::SkipIfPressed(vx) => {
                Next::SkipIf(self.keyboard.get_key_status_from_num(self.regs.get(vx)))
            }
            OpCodes::SkipIfNotPressed(vx) => {
                Next::SkipIf(!self.keyboard.get_key_status_from_num(self.regs.get(vx)))
            }
            OpCodes::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.delay_timer.count);
                Next::Advance
            }
            OpCodes::GetKey(vx) => {
                self.state = VmState::WaitingForKey { register: vx };
                Next::Advance
            }
            OpCodes::CopyRegisterToDelay(vx) => {
                self.delay_timer.set(self.regs.get(vx));
                Next::Advance
            }
            OpCodes::CopyRegisterToSound(vx) => {
                self.sound_timer.set(self.regs.get(vx));
                Next::Advance
            }
            OpCodes::AddToIndex(vx) => {
                self.mem.index.offset(self.regs.get(vx) as TypeAddr);
                Next::Advance
            }
            OpCodes::PointChar(vx) => {
                let digit = (self.regs.get(vx) & 0xF) as TypeAddr;
                self.mem.index.set_addr(FONT_ADDR + digit * FONT_GLYPH_LEN);
                Next::Advance
            }
            OpCodes::PointBigChar(vx) => {
                let digit = (self.regs.get(vx) % 10) as TypeAddr;
                self.mem
                    .index
                    .set_addr(BIG_FONT_ADDR + digit * BIG_FONT_GLYPH_LEN);
                Next::Advance
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let base = self.mem.index.0;
                self.mem.set(base, value / 100);
                self.mem.set(base + 1, value / 10 % 10);
                self.mem.set(base + 2, value % 10);
                Next::Advance
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    self.mem.set(base + reg as TypeAddr, self.regs.get(reg));
                }
                if quirks.memory_increments_index {
                    self.mem.index.offset(vx as TypeAddr + 1);
                }
                Next::Advance
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                let base = self.mem.index.0;
                for reg in 0..=vx {
                    self.regs
                        .set_register(reg, self.mem.get(base + reg as TypeAddr));
                }
                if quirks.memory_increments_index {
                    self.mem.index.offset(vx as TypeAddr + 1);
                }
                Next::Advance
            }
            OpCodes::ScrollDown(n) => {
                self.fb.scroll_down(n as usize);
                self.redraw = true;
                Next::Advance
            }
            OpCodes::ScrollRight => {
                self.fb.scroll_right(4);
                self.redraw = true;
                Next::Advance
            }
            OpCodes::ScrollLeft => {
                self.fb.scroll_left(4);
                self.redraw = true;
                Next::Advance
            }
            OpCodes::Exit => {
                self.state = VmState::Halted(Halt::Stopped);
                Next::Advance
            }
            OpCodes::LowRes | OpCodes::HighRes => {
                self.fb.set_hires(ins == OpCodes::HighRes);
                self.redraw = true;
                Next::Advance
            }
            OpCodes::StoreFlags(vx) => {
                for reg in 0..=vx.min(7) {
                    self.rpl_flags[reg as usize] = self.regs.get(reg);
                }
                Next::Advance
            }
            OpCodes::LoadFlags(vx) => {
                for reg in 0..=vx.min(7) {
                    self.regs.set_register(reg, self.rpl_flags[reg as usize]);
                }
                Next::Advance
            }
        };

        match next {
            Next::Advance => self.mem.pc.increment(),
            Next::SkipIf(true) => self.mem.pc.skip(),
            Next::SkipIf(false) => self.mem.pc.increment(),
            Next::Jump(addr) => self.mem.pc.set_addr(addr),
        }
        Ok(())
    }

    fn logic(&mut self, vx: u8, value: u8) {
        self.regs.set_register(vx, value);
        if self.config.quirks.logic_resets_vf {
            self.regs.set_register(FLAG, 0);
        }
    }

    // DXYN; DXY0 on SUPER-CHIP draws a 16x16 sprite from 32 bytes
    fn draw(&mut self, reg_x: u8, reg_y: u8, height: u8) {
        let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
        let base = self.mem.index.0;
        let (sprite, row_width): (Vec<u16>, usize) =
            if height == 0 && self.config.variant == Variant::SuperChip {
                let rows = (0..16)
                    .map(|row| {
                        let addr = base + row * 2;
                        u16::from_be_bytes([self.mem.get(addr), self.mem.get(addr + 1)])
                    })
                    .collect();
                (rows, 16)
            } else {
                let rows = (0..height as TypeAddr)
                    .map(|row| self.mem.get(base + row) as u16)
                    .collect();
                (rows, 8)
            };

        let collision = self
            .fb
            .paint(x, y, &sprite, row_width, self.config.quirks.clip_sprites);
        self.regs.set_register(FLAG, collision as u8);
        self.redraw = true;
    }

    /// Decrements both timers; call at 60 Hz.
    pub fn tick_60hz(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Reports a key change. A press while FX0A is waiting stores the key and
    /// resumes execution.
    pub fn set_key(&mut self, index: u8, pressed: bool) {
        if !self.keyboard.update_key(index, pressed) {
            log::warn!("ignoring key {index:#04X}: not on the keypad");
            return;
        }
        if !pressed {
            return;
        }
        if let VmState::WaitingForKey { register } = self.state {
            self.regs.set_register(register, index);
            self.state = VmState::Running;
        }
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    /// True if the screen changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn is_sound_playing(&self) -> bool {
        self.sound_timer.is_active()
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pc(&self) -> TypeAddr {
        self.mem.pc.0
    }

    pub fn index(&self) -> TypeAddr {
        self.mem.index.0
    }

    pub fn register(&self, reg_num: u8) -> u8 {
        self.regs.get(reg_num)
    }

    pub fn registers(&self) -> &[u8; 16] {
        self.regs.as_slice()
    }

    pub fn stack_depth(&self) -> usize {
        self.mem.stack.depth()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.count
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.count
    }

    pub fn peek(&self, addr: TypeAddr) -> u8 {
        self.mem.get(addr)
    }
}
