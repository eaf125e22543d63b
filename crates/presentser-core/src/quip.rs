use rand::Rng;

pub const LOW: &[&str] = &[
    "Pavam 😬 time to attend more classes!",
    "Oy! wake up, bro. Attendance needs work. 💪",
];

pub const MID: &[&str] = &[
    "Not bad. Steady wins the race. 🚶",
    "Keep going! Two more and you'll be safe. ✌️",
];

pub const HIGH: &[&str] = &[
    "Champion! 🎉 Keep that streak going.",
    "Nice, that's the campus flex. 💯",
];

/// Message pool for an attendance percentage: below 50, below 75, or above.
pub fn pool_for(pct: f64) -> &'static [&'static str] {
    if pct < 50.0 {
        LOW
    } else if pct < 75.0 {
        MID
    } else {
        HIGH
    }
}

/// Pick one quip from the band `pct` falls in.
pub fn pick_quip<R: Rng + ?Sized>(pct: f64, rng: &mut R) -> &'static str {
    let pool = pool_for(pct);
    pool[rng.gen_range(0..pool.len())]
}
