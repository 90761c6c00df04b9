//! End-to-end test: the particle batch scenario.
//!
//! Compiles a particle tick routine and drives it across several work units
//! for many ticks, checking movement, expiry isolation, and the shared
//! global counter.

use swarm_vm::{compile, run, Program};

const SCRIPT: &str = r#"
// Per-particle tick routine. One work unit is one particle.
GlobalScope[16]{
    [0]->PassCounter;
    [4]->DeltaTime;
    [8]->ParticleLifeTime;
    [12]->SpareInteger;
};
WorkScope[32]{
    [0,4,8]->Pos[X,Y,Z];
    [12,16,20]->Dir[X,Y,Z];
    [24]->Gravity;
    [28]->Lifetime;
};
LocalScope[4]{
    [0]->Expired;
};
Worker{
    Int::++(GlobalScope::PassCounter);
    Expired=Float::>(Lifetime,ParticleLifeTime);
    VM::HaltConditional(Expired);
    Float::++(Lifetime);
    Pos.X=Float::+(Pos.X,Dir.X);
    Pos.Y=Float::+(Pos.Y,Dir.Y);
    Pos.Z=Float::+(Pos.Z,Dir.Z);
    VM::Halt();
};
"#;

const STRIDE: usize = 32;
const UNITS: usize = 3;

fn write_f32(buf: &mut [u8], at: usize, value: f32) {
    buf[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn read_f32(buf: &[u8], at: usize) -> f32 {
    f32::from_ne_bytes(buf[at..at + 4].try_into().unwrap())
}

fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_ne_bytes(buf[at..at + 4].try_into().unwrap())
}

/// Global block plus `UNITS` particles; particle 0 starts past its
/// lifetime, the rest start fresh.
fn scenario() -> (Vec<u8>, Vec<u8>) {
    let mut global = vec![0u8; 16];
    write_f32(&mut global, 4, 0.1); // DeltaTime
    write_f32(&mut global, 8, 25.0); // ParticleLifeTime

    let mut work = vec![0u8; STRIDE * UNITS];
    for unit in 0..UNITS {
        let base = unit * STRIDE;
        write_f32(&mut work, base, 1.0 + unit as f32); // Pos.X
        write_f32(&mut work, base + 12, 1.0); // Dir.X
        write_f32(&mut work, base + 16, 1.0); // Dir.Y
        write_f32(&mut work, base + 20, 1.0); // Dir.Z
        write_f32(&mut work, base + 24, -10.0); // Gravity
    }
    write_f32(&mut work, 28, 30.0); // particle 0 is already expired

    (global, work)
}

fn tick(program: &Program, global: &mut [u8], work: &mut [u8], ticks: usize) {
    for _ in 0..ticks {
        run(program, global, work, STRIDE, UNITS).unwrap();
    }
}

#[test]
fn test_expired_particle_freezes_while_others_move() {
    let program = compile(SCRIPT).unwrap();
    let (mut global, mut work) = scenario();

    tick(&program, &mut global, &mut work, 10);

    // Particle 0 tripped the conditional halt every tick and never moved.
    assert_eq!(read_f32(&work, 0), 1.0);
    assert_eq!(read_f32(&work, 28), 30.0);

    // Particles 1 and 2 advanced one Dir step per tick.
    assert_eq!(read_f32(&work, STRIDE), 12.0);
    assert_eq!(read_f32(&work, STRIDE + 4), 10.0);
    assert_eq!(read_f32(&work, 2 * STRIDE), 13.0);
    assert_eq!(read_f32(&work, 2 * STRIDE + 28), 10.0);
}

#[test]
fn test_particles_stop_after_lifetime_elapses() {
    let program = compile(SCRIPT).unwrap();
    let (mut global, mut work) = scenario();

    tick(&program, &mut global, &mut work, 600);

    // A fresh particle moves while Lifetime <= 25, taking its last step on
    // the tick that carries Lifetime to 26; afterwards it is frozen.
    assert_eq!(read_f32(&work, STRIDE + 28), 26.0);
    assert_eq!(read_f32(&work, STRIDE), 28.0);
    assert_eq!(read_f32(&work, STRIDE + 4), 26.0);
}

#[test]
fn test_pass_counter_counts_every_unit_every_tick() {
    let program = compile(SCRIPT).unwrap();
    let (mut global, mut work) = scenario();

    tick(&program, &mut global, &mut work, 10);

    // The increment runs before the expiry check, so even halted particles
    // count one pass per tick.
    assert_eq!(read_i32(&global, 0), (10 * UNITS) as i32);
}

#[test]
fn test_program_serde_round_trip() {
    let program = compile(SCRIPT).unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let restored: Program = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, program);

    let reloaded = Program::from_bytes(program.bytes().to_vec());
    assert_eq!(reloaded, program);
}
