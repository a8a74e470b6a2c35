//! Homomorphic derivation of the dice outcome.
//!
//! The ledger never decrypts. It asks an [`FheExecutor`] to combine
//! ciphertexts and receives new handles back. [`ArithmeticEngine`] fixes the
//! game's circuit on top of that capability:
//!
//! ```text
//! roll = (seed mod 6) + 1
//! win  = roll == guess
//! ```
//!
//! Guesses are not range-checked. A guess outside `1..=6` can never equal a
//! roll and is therefore a loss.

mod errors;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::ExecutorError;

use crate::config::GameConfig;
use crate::handle::{
    CiphertextHandle, Encrypted, EncryptedBool, EncryptedU32, ExternalInput, PlaintextType,
};
use crate::identity::{Address, Scope};

/// Binding under which an external input must have been produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputContext {
    /// Ledger instance the ciphertext is meant for.
    pub scope: Scope,
    /// Account that encrypted the value and is submitting it.
    pub signer: Address,
}

/// Encrypted computation capability used by the ledger.
///
/// Implementations are bound to a single [`Scope`]; every handle they return
/// belongs to it. Operations on handles that were neither verified through
/// [`FheExecutor::verify_input`] nor produced by the executor must fail.
pub trait FheExecutor {
    /// Verifies an externally produced 32-bit ciphertext against its proof and
    /// returns a typed handle usable in the current transaction.
    fn verify_input(
        &mut self,
        input: &ExternalInput,
        context: InputContext,
    ) -> Result<EncryptedU32, ExecutorError>;

    /// `lhs mod modulus` with a plaintext modulus.
    fn rem_scalar(&mut self, lhs: EncryptedU32, modulus: u32)
    -> Result<EncryptedU32, ExecutorError>;

    /// `lhs + rhs` (wrapping) with a plaintext addend.
    fn add_scalar(&mut self, lhs: EncryptedU32, rhs: u32) -> Result<EncryptedU32, ExecutorError>;

    /// Encrypted equality of two 32-bit values.
    fn eq(&mut self, lhs: EncryptedU32, rhs: EncryptedU32) -> Result<EncryptedBool, ExecutorError>;

    /// Grants `account` persistent permission to decrypt `handle`.
    fn allow(&mut self, handle: CiphertextHandle, account: Address) -> Result<(), ExecutorError>;
}

/// The dice circuit expressed over an [`FheExecutor`].
pub struct ArithmeticEngine<'x, X: FheExecutor + ?Sized> {
    executor: &'x mut X,
}

impl<'x, X: FheExecutor + ?Sized> ArithmeticEngine<'x, X> {
    pub fn new(executor: &'x mut X) -> Self {
        Self { executor }
    }

    /// Validates an external input for `context`.
    pub fn import(
        &mut self,
        input: &ExternalInput,
        context: InputContext,
    ) -> Result<EncryptedU32, ExecutorError> {
        self.executor.verify_input(input, context)
    }

    /// Derives an encrypted roll in `1..=6` equivalent to `(seed mod 6) + 1`.
    ///
    /// The same seed always yields the same roll value, though the returned
    /// handle differs between calls.
    pub fn derive_roll(&mut self, seed: EncryptedU32) -> Result<EncryptedU32, ExecutorError> {
        let reduced = self.executor.rem_scalar(seed, GameConfig::DIE_FACES)?;
        self.executor.add_scalar(reduced, 1)
    }

    /// Derives `roll == guess` without decrypting either operand.
    pub fn derive_win_flag(
        &mut self,
        roll: EncryptedU32,
        guess: EncryptedU32,
    ) -> Result<EncryptedBool, ExecutorError> {
        self.executor.eq(roll, guess)
    }

    /// Grants decrypt permission on `value` to the scope itself and to each
    /// listed account.
    pub fn grant<T: PlaintextType>(
        &mut self,
        value: Encrypted<T>,
        scope: Scope,
        accounts: &[Address],
    ) -> Result<(), ExecutorError> {
        self.executor.allow(value.handle(), scope.address())?;
        for account in accounts {
            self.executor.allow(value.handle(), *account)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::PlainExecutor;
    use super::*;

    fn context(executor: &PlainExecutor) -> InputContext {
        InputContext {
            scope: executor.scope(),
            signer: Address::from_bytes([9; 20]),
        }
    }

    #[test]
    fn roll_matches_seed_mod_six_plus_one() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);

        for seed in [0u32, 1, 5, 6, 12345, 22222, u32::MAX] {
            let input = executor.encrypt(seed, ctx);
            let mut engine = ArithmeticEngine::new(&mut executor);
            let seed_ct = engine.import(&input, ctx).unwrap();
            let roll = engine.derive_roll(seed_ct).unwrap();

            let clear = executor.peek_u32(roll.handle()).unwrap();
            assert_eq!(clear, seed % 6 + 1, "seed {seed}");
            assert!((1..=6).contains(&clear));
        }
    }

    #[test]
    fn same_seed_gives_same_value_under_fresh_handles() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);
        let input = executor.encrypt(777, ctx);

        let mut engine = ArithmeticEngine::new(&mut executor);
        let seed = engine.import(&input, ctx).unwrap();
        let first = engine.derive_roll(seed).unwrap();
        let second = engine.derive_roll(seed).unwrap();

        assert_ne!(first.handle(), second.handle());
        assert_eq!(
            executor.peek_u32(first.handle()),
            executor.peek_u32(second.handle())
        );
    }

    #[test]
    fn out_of_range_guess_never_wins() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);

        for (seed, guess) in [(3u32, 0u32), (5, 7), (11, u32::MAX)] {
            let seed_input = executor.encrypt(seed, ctx);
            let guess_input = executor.encrypt(guess, ctx);
            let mut engine = ArithmeticEngine::new(&mut executor);
            let seed_ct = engine.import(&seed_input, ctx).unwrap();
            let guess_ct = engine.import(&guess_input, ctx).unwrap();
            let roll = engine.derive_roll(seed_ct).unwrap();
            let win = engine.derive_win_flag(roll, guess_ct).unwrap();

            assert_eq!(executor.peek_bool(win.handle()), Some(false));
        }
    }

    #[test]
    fn matching_guess_wins() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);
        // 12345 mod 6 = 3, so the roll is 4.
        let seed_input = executor.encrypt(12345, ctx);
        let guess_input = executor.encrypt(4, ctx);

        let mut engine = ArithmeticEngine::new(&mut executor);
        let seed = engine.import(&seed_input, ctx).unwrap();
        let guess = engine.import(&guess_input, ctx).unwrap();
        let roll = engine.derive_roll(seed).unwrap();
        let win = engine.derive_win_flag(roll, guess).unwrap();

        assert_eq!(executor.peek_bool(win.handle()), Some(true));
    }

    #[test]
    fn unverified_operand_is_rejected() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);
        let input = executor.encrypt(10, ctx);
        let unverified = EncryptedU32::from_handle(input.handle);

        let mut engine = ArithmeticEngine::new(&mut executor);
        let err = engine.derive_roll(unverified).unwrap_err();
        assert!(matches!(err, ExecutorError::NotVerified(h) if h == input.handle));
    }

    #[test]
    fn grant_covers_scope_and_accounts() {
        let mut executor = PlainExecutor::default();
        let ctx = context(&executor);
        let input = executor.encrypt(1, ctx);
        let player = Address::from_bytes([4; 20]);

        let mut engine = ArithmeticEngine::new(&mut executor);
        let value = engine.import(&input, ctx).unwrap();
        engine.grant(value, ctx.scope, &[player]).unwrap();

        assert!(executor.is_allowed(value.handle(), ctx.scope.address()));
        assert!(executor.is_allowed(value.handle(), player));
        assert!(!executor.is_allowed(value.handle(), ctx.signer));
    }
}
