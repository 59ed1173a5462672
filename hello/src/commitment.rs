use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};


/// How durably the cluster has committed a transaction or a state read.
///
/// Levels are ordered from the least to the most durable.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
)]
pub enum ConfirmationLevel {
    /// Processed by the node but possibly on a minority fork.
    #[display("processed")]
    Processed,
    /// Voted on by a supermajority of the cluster.
    #[default]
    #[display("confirmed")]
    Confirmed,
    /// Rooted; the block cannot be rolled back.
    #[display("finalized")]
    Finalized,
}

impl From<ConfirmationLevel> for CommitmentLevel {
    fn from(level: ConfirmationLevel) -> Self {
        match level {
            ConfirmationLevel::Processed => Self::Processed,
            ConfirmationLevel::Confirmed => Self::Confirmed,
            ConfirmationLevel::Finalized => Self::Finalized,
        }
    }
}

impl From<ConfirmationLevel> for CommitmentConfig {
    fn from(level: ConfirmationLevel) -> Self {
        Self { commitment: level.into() }
    }
}


#[test]
fn test_ordering() {
    use ConfirmationLevel::*;
    assert!(Processed < Confirmed);
    assert!(Confirmed < Finalized);
    assert_eq!(Confirmed, ConfirmationLevel::default());
    assert_eq!(
        CommitmentConfig::finalized(),
        CommitmentConfig::from(Finalized)
    );
    assert_eq!(CommitmentLevel::Processed, CommitmentLevel::from(Processed));
}
