//! Player-facing game flow: play, refresh, reveal, withdraw.

use dice_core::{Address, DiceError, ErrorKind, GameConfig, commit};
use tracing::info;

use crate::decrypt::{DecryptError, UserDecryptor, expect_bool, expect_u32};
use crate::gateway::EncryptionGateway;
use crate::traits::{
    EncryptionCapability, EncryptionError, GameLedger, IdentitySigner, LedgerError,
    ResolutionCapability, ResolveError,
};
use crate::types::{EncryptedSnapshot, FairnessRecord, GameReveal, HandleScope, TransactionId};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("guess {0} is not a die face (1..={faces})", faces = GameConfig::DIE_FACES)]
    InvalidGuess(u32),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Decrypt(#[from] DecryptError),
}

impl DiceError for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGuess(_) => ErrorKind::Validation,
            Self::Encryption(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Decrypt(e) => e.kind(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidGuess(_) => "INVALID_GUESS",
            Self::Encryption(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Decrypt(e) => e.error_code(),
        }
    }
}

/// One player's view of a dice ledger.
pub struct DiceSession<L, E, R, S> {
    ledger: L,
    gateway: EncryptionGateway<E>,
    decryptor: UserDecryptor<R, S>,
}

impl<L, E, R, S> DiceSession<L, E, R, S>
where
    L: GameLedger,
    E: EncryptionCapability,
    R: ResolutionCapability,
    S: IdentitySigner,
{
    pub fn new(ledger: L, gateway: EncryptionGateway<E>, decryptor: UserDecryptor<R, S>) -> Self {
        Self {
            ledger,
            gateway,
            decryptor,
        }
    }

    pub fn player(&self) -> Address {
        self.decryptor.identity()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Encrypt `seed` and `guess`, then submit a play paying the entry fee.
    ///
    /// Guesses outside the die faces are refused before anything is
    /// encrypted. The ledger would accept them as a certain loss.
    pub async fn play(&self, seed: u32, guess: u32) -> Result<FairnessRecord, SessionError> {
        if !(1..=GameConfig::DIE_FACES).contains(&guess) {
            return Err(SessionError::InvalidGuess(guess));
        }
        let player = self.player();
        let (scope, fee) = tokio::try_join!(self.ledger.scope(), self.ledger.entry_fee())?;

        let commitment = commit(seed);
        let (seed_input, guess_input) = self
            .gateway
            .encrypt_play(seed, guess, scope, player)
            .await?;
        let transaction = self
            .ledger
            .play(player, seed_input, guess_input, fee)
            .await?;

        info!(
            target: "client::session",
            %player,
            %transaction,
            "play submitted"
        );
        Ok(FairnessRecord {
            seed,
            guess,
            commitment,
            transaction,
        })
    }

    /// Read the latest-game handles as one snapshot.
    pub async fn refresh(&self) -> Result<EncryptedSnapshot, SessionError> {
        Ok(self.ledger.latest_play().await?)
    }

    /// Decrypt the latest game with a single authorization.
    pub async fn reveal(&self) -> Result<GameReveal, SessionError> {
        let snapshot = self.refresh().await?;
        let scope = self.ledger.scope().await?;
        let batch = [
            HandleScope::new(snapshot.dice_roll.handle(), scope),
            HandleScope::new(snapshot.player_guess.handle(), scope),
            HandleScope::new(snapshot.winner_flag.handle(), scope),
        ];
        let values = self.decryptor.decrypt(&batch).await?;
        Ok(GameReveal {
            dice_roll: expect_u32(&values, snapshot.dice_roll.handle())?,
            player_guess: expect_u32(&values, snapshot.player_guess.handle())?,
            won: expect_bool(&values, snapshot.winner_flag.handle())?,
        })
    }

    /// Decrypt the latest game with one independent request per field.
    pub async fn reveal_each(&self) -> Result<GameReveal, SessionError> {
        let snapshot = self.refresh().await?;
        if snapshot.is_unset() {
            return Err(DecryptError::from(ResolveError::UnknownHandle(
                snapshot.dice_roll.handle(),
            ))
            .into());
        }
        let scope = self.ledger.scope().await?;
        let (dice_roll, player_guess, won) = tokio::try_join!(
            self.decryptor.decrypt_u32(snapshot.dice_roll, scope),
            self.decryptor.decrypt_u32(snapshot.player_guess, scope),
            self.decryptor.decrypt_bool(snapshot.winner_flag, scope),
        )?;
        Ok(GameReveal {
            dice_roll,
            player_guess,
            won,
        })
    }

    /// Withdraw the ledger balance; only succeeds for the owner.
    pub async fn withdraw(&self) -> Result<TransactionId, SessionError> {
        Ok(self.ledger.withdraw(self.player()).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::{MockEncryptor, MockLedger, MockRelay};
    use crate::signer::LocalSigner;
    use crate::types::ClearValue;
    use dice_core::{CiphertextHandle, EncryptedBool, EncryptedU32, Scope, WithdrawError};

    const FEE: u128 = GameConfig::ENTRY_FEE_WEI;

    struct Fixture {
        ledger: MockLedger,
        encryptor: MockEncryptor,
        relay: MockRelay,
        session: DiceSession<MockLedger, MockEncryptor, MockRelay, LocalSigner>,
    }

    fn fixture() -> Fixture {
        let scope = Scope::new(Address::from_bytes([0x5c; 20]));
        let ledger = MockLedger::new(scope, Address::from_bytes([0x0a; 20]), FEE);
        let encryptor = MockEncryptor::default();
        let clock = ManualClock::new(1_760_000_000);
        let relay = MockRelay::new(clock.clone());
        let session = DiceSession::new(
            ledger.clone(),
            EncryptionGateway::new(encryptor.clone(), Duration::from_secs(1)),
            UserDecryptor::new(relay.clone(), LocalSigner::random()).with_clock(Arc::new(clock)),
        );
        Fixture {
            ledger,
            encryptor,
            relay,
            session,
        }
    }

    #[tokio::test]
    async fn play_pays_entry_fee_and_returns_commitment() {
        let f = fixture();
        let record = f.session.play(12345, 4).await.unwrap();

        assert!(record.verify());
        assert_eq!(record.commitment, commit(12345));
        let plays = f.ledger.plays.lock().unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].0, f.session.player());
        assert_eq!(plays[0].3, FEE);
    }

    #[tokio::test]
    async fn out_of_range_guess_is_refused_before_encryption() {
        let f = fixture();
        for guess in [0, 7, u32::MAX] {
            let err = f.session.play(1, guess).await.unwrap_err();
            assert_eq!(err, SessionError::InvalidGuess(guess));
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(f.encryptor.values.lock().unwrap().is_empty());
        assert!(f.ledger.plays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reveal_before_any_play_is_unknown_handle() {
        let f = fixture();
        assert!(f.session.refresh().await.unwrap().is_unset());

        let err = f.session.reveal().await.unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_HANDLE");
        let err = f.session.reveal_each().await.unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_HANDLE");
        assert!(f.relay.requests().is_empty());
    }

    #[tokio::test]
    async fn reveal_batches_and_reveal_each_splits() {
        let f = fixture();
        let player = f.session.player();
        let scope = f.ledger.scope;
        let roll = f.relay.insert(ClearValue::U32(4), scope, &[player]);
        let guess = f.relay.insert(ClearValue::U32(4), scope, &[player]);
        let flag = f.relay.insert(ClearValue::Bool(true), scope, &[player]);
        *f.ledger.latest.lock().unwrap() = (
            EncryptedU32::from_handle(roll),
            EncryptedU32::from_handle(guess),
            EncryptedBool::from_handle(flag),
        );

        let expected = GameReveal {
            dice_roll: 4,
            player_guess: 4,
            won: true,
        };
        assert_eq!(f.session.reveal().await.unwrap(), expected);
        assert_eq!(f.relay.requests().len(), 1);

        assert_eq!(f.session.reveal_each().await.unwrap(), expected);
        assert_eq!(f.relay.requests().len(), 4);
    }

    #[tokio::test]
    async fn refresh_returns_latest_snapshot() {
        let f = fixture();
        assert!(f.session.refresh().await.unwrap().is_unset());

        let snapshot = EncryptedSnapshot {
            dice_roll: EncryptedU32::from_handle(CiphertextHandle::from_bytes([1; 32])),
            player_guess: EncryptedU32::from_handle(CiphertextHandle::from_bytes([2; 32])),
            winner_flag: EncryptedBool::from_handle(CiphertextHandle::from_bytes([3; 32])),
        };
        *f.ledger.latest.lock().unwrap() =
            (snapshot.dice_roll, snapshot.player_guess, snapshot.winner_flag);
        assert_eq!(f.session.refresh().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn withdraw_by_non_owner_surfaces_authorization_error() {
        let f = fixture();
        let err = f.session.withdraw().await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Ledger(LedgerError::Withdraw(WithdrawError::OnlyOwnerCanWithdraw {
                caller: f.session.player()
            }))
        );
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }
}
