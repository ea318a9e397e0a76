//! Thread-local RNG implementation of the [`InviteCodeSource`] port.

use rand::Rng;

use crate::domain::InviteCode;
use crate::domain::ports::InviteCodeSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInviteCodes;

impl InviteCodeSource for RandomInviteCodes {
    fn generate(&self) -> InviteCode {
        let mut rng = rand::thread_rng();
        InviteCode::generate_with(|len| rng.gen_range(0..len))
    }
}
