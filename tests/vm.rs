use chipvm::{Config, Emulator, ExecError, Halt, LoadError, Quirks, Variant, VmState};

fn rom(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

#[test]
fn runs_a_rom_from_disk() {
    let bytes = std::fs::read("tests/files/zero.ch8").unwrap();
    let mut emu = Emulator::load(&bytes).unwrap();
    for _ in 0..10 {
        emu.step().unwrap();
    }
    let fb = emu.framebuffer();
    assert_eq!((fb.width(), fb.height()), (64, 32));
    let top: Vec<bool> = fb.rows().next().unwrap()[..5].to_vec();
    assert_eq!(top, [true, true, true, true, false]);
    assert_eq!(emu.pc(), 0x206);
    assert_eq!(*emu.state(), VmState::Running);
}

#[test]
fn stepping_before_load_fails() {
    let mut emu = Emulator::with_config(Config::default());
    assert_eq!(*emu.state(), VmState::Uninitialized);
    assert_eq!(emu.step(), Err(ExecError::NotLoaded));
}

#[test]
fn rom_size_limit() {
    assert!(Emulator::load(&vec![0x12; 3584]).is_ok());
    assert_eq!(
        Emulator::load(&vec![0x12; 3585]).err(),
        Some(LoadError::TooLarge {
            size: 3585,
            max: 3584
        })
    );
}

#[test]
fn instances_are_independent() {
    let program = rom(&[0x7001, 0x1200]);
    let mut a = Emulator::load(&program).unwrap();
    let b = Emulator::load(&program).unwrap();
    a.step().unwrap();
    assert_eq!(a.register(0), 1);
    assert_eq!(b.register(0), 0);
}

#[test]
fn countdown_loop_with_timers() {
    // V0 = 3; DT = V0; loop: V1 = DT; SE V1, 0; JP loop; EXIT
    let program = rom(&[0x6003, 0xF015, 0xF107, 0x3100, 0x1204, 0x00FD]);
    let config = Config {
        variant: Variant::SuperChip,
        ..Config::default()
    };
    let mut emu = Emulator::load_with_config(&program, config).unwrap();

    let mut ticks = 0;
    while *emu.state() != VmState::Halted(Halt::Stopped) {
        for _ in 0..4 {
            emu.step().unwrap();
        }
        emu.tick_60hz();
        ticks += 1;
        assert!(ticks < 10, "program never exited");
    }
    assert_eq!(emu.delay_timer(), 0);
    assert_eq!(emu.register(1), 0);
}

#[test]
fn keypress_resumes_a_waiting_program() {
    let program = rom(&[0xF30A, 0x6401, 0x1204]);
    let mut emu = Emulator::load(&program).unwrap();
    emu.step().unwrap();
    assert_eq!(*emu.state(), VmState::WaitingForKey { register: 3 });

    for _ in 0..5 {
        emu.step().unwrap();
    }
    assert_eq!(emu.pc(), 0x202);

    emu.set_key(0xB, true);
    emu.step().unwrap();
    assert_eq!(emu.register(3), 0xB);
    assert_eq!(emu.register(4), 1);
}

#[test]
fn cosmac_dialect_end_to_end() {
    // V1 = 0x10, V2 = 0x03, V1 = V2 << 1, I = 0x300, [I] = V0..V2
    let program = rom(&[0x6110, 0x6203, 0x812E, 0xA300, 0xF255]);
    let config = Config {
        quirks: Quirks::cosmac_vip(),
        seed: Some(1),
        ..Config::default()
    };
    let mut emu = Emulator::load_with_config(&program, config).unwrap();
    for _ in 0..5 {
        emu.step().unwrap();
    }
    assert_eq!(emu.register(1), 0x06);
    assert_eq!(emu.register(0xF), 0);
    assert_eq!(emu.index(), 0x303);
    assert_eq!([emu.peek(0x300), emu.peek(0x301), emu.peek(0x302)], [0, 6, 3]);
}

#[test]
fn fault_reports_and_sticks() {
    let mut emu = Emulator::load(&rom(&[0x00EE])).unwrap();
    let err = ExecError::StackUnderflow { pc: 0x200 };
    assert_eq!(emu.step(), Err(err.clone()));
    assert_eq!(*emu.state(), VmState::Halted(Halt::Fault(err.clone())));
    assert_eq!(emu.step(), Err(err));

    emu.reset();
    assert_eq!(*emu.state(), VmState::Loaded);
    assert_eq!(emu.pc(), 0x200);
}
