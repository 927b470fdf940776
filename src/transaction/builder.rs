use crate::identity::{Address, Keypair, Signer};
use crate::transaction::{
    compute_hash, CodecError, Memo, Network, Operation, OperationError, TransactionCodec,
};
use stellar_xdr::curr::{
    self as xdr, Preconditions, SequenceNumber, Transaction, TransactionExt, VecM,
};
use thiserror::Error;

/// Fee per operation, in stroops, when no `BaseFee` mutator is given
pub const DEFAULT_BASE_FEE: u32 = 100;

/// Maximum number of operations in one transaction
pub const MAX_OPERATIONS: usize = 100;

/// Errors that can occur when composing a transaction
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Mutator conflict: {0} set more than once")]
    MutatorConflict(&'static str),

    #[error("Incomplete transaction: missing {0}")]
    IncompleteTransaction(&'static str),

    #[error("Bad operation: {0}")]
    BadOperation(#[from] OperationError),

    #[error("Too many operations: {0}, at most 100 allowed")]
    TooManyOperations(usize),

    #[error("Sequence number {0} does not fit the ledger's signed 64-bit range")]
    SequenceOutOfRange(u64),

    #[error("Fee overflow: {base_fee} x {operations} operations")]
    FeeOverflow { base_fee: u32, operations: usize },
}

// ============================================================================
// MUTATORS
// ============================================================================

/// One instruction contributing a field or an operation to a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutator {
    SourceAccount(Address),
    Sequence(u64),
    Network(Network),
    BaseFee(u32),
    Operation(Operation),
    Memo(Memo),
}

impl From<Operation> for Mutator {
    fn from(operation: Operation) -> Self {
        Mutator::Operation(operation)
    }
}

impl From<Memo> for Mutator {
    fn from(memo: Memo) -> Self {
        Mutator::Memo(memo)
    }
}

#[derive(Default)]
struct Draft {
    source: Option<Address>,
    sequence: Option<u64>,
    network: Option<Network>,
    base_fee: Option<u32>,
    memo: Option<Memo>,
    operations: Vec<Operation>,
}

fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), ComposeError> {
    if slot.is_some() {
        return Err(ComposeError::MutatorConflict(field));
    }
    *slot = Some(value);
    Ok(())
}

impl Draft {
    fn apply(&mut self, mutator: Mutator) -> Result<(), ComposeError> {
        match mutator {
            Mutator::SourceAccount(address) => set_once(&mut self.source, address, "source account"),
            Mutator::Sequence(sequence) => set_once(&mut self.sequence, sequence, "sequence"),
            Mutator::Network(network) => set_once(&mut self.network, network, "network"),
            Mutator::BaseFee(fee) => set_once(&mut self.base_fee, fee, "base fee"),
            Mutator::Memo(memo) => set_once(&mut self.memo, memo, "memo"),
            Mutator::Operation(operation) => {
                self.operations.push(operation);
                Ok(())
            }
        }
    }

    fn finalize(self) -> Result<UnsignedTransaction, ComposeError> {
        let source = self
            .source
            .ok_or(ComposeError::IncompleteTransaction("source account"))?;
        let sequence = self
            .sequence
            .ok_or(ComposeError::IncompleteTransaction("sequence"))?;
        let network = self
            .network
            .ok_or(ComposeError::IncompleteTransaction("network"))?;

        if self.operations.is_empty() {
            return Err(ComposeError::IncompleteTransaction("operations"));
        }
        if self.operations.len() > MAX_OPERATIONS {
            return Err(ComposeError::TooManyOperations(self.operations.len()));
        }

        let base_fee = self.base_fee.unwrap_or(DEFAULT_BASE_FEE);
        let operation_count = self.operations.len();
        let fee = u32::try_from(operation_count)
            .ok()
            .and_then(|count| base_fee.checked_mul(count))
            .ok_or(ComposeError::FeeOverflow {
                base_fee,
                operations: operation_count,
            })?;

        let operations = self
            .operations
            .iter()
            .map(Operation::to_xdr)
            .collect::<Result<Vec<_>, _>>()?;
        let operations: VecM<xdr::Operation, 100> = operations
            .try_into()
            .map_err(|_| ComposeError::TooManyOperations(operation_count))?;

        let memo = match &self.memo {
            Some(memo) => memo.to_xdr()?,
            None => xdr::Memo::None,
        };

        let tx = Transaction {
            source_account: source.to_muxed_account(),
            fee,
            seq_num: SequenceNumber(to_ledger_sequence(sequence)?),
            cond: Preconditions::None,
            memo,
            operations,
            ext: TransactionExt::V0,
        };

        Ok(UnsignedTransaction { tx, network })
    }
}

/// Convert a local sequence counter into the ledger's signed representation
pub fn to_ledger_sequence(sequence: u64) -> Result<i64, ComposeError> {
    i64::try_from(sequence).map_err(|_| ComposeError::SequenceOutOfRange(sequence))
}

/// Apply mutators in order and produce an unsigned transaction
///
/// Pure: no network or disk access.
pub fn compose<I>(mutators: I) -> Result<UnsignedTransaction, ComposeError>
where
    I: IntoIterator<Item = Mutator>,
{
    let mut draft = Draft::default();
    for mutator in mutators {
        draft.apply(mutator)?;
    }
    draft.finalize()
}

/// Build a transaction with sequence 0 for a counterparty to sequence and sign
pub fn build_unsigned(
    source: Address,
    network_passphrase: &str,
    operation: Operation,
    memo: Option<Memo>,
) -> Result<Transaction, ComposeError> {
    let mut mutators = vec![
        Mutator::SourceAccount(source),
        Mutator::Sequence(0),
        Mutator::Network(Network::new(network_passphrase)),
        Mutator::Operation(operation),
    ];
    if let Some(memo) = memo {
        mutators.push(Mutator::Memo(memo));
    }

    compose(mutators).map(UnsignedTransaction::into_inner)
}

/// Sign a composed transaction with every given keypair and encode the envelope
pub fn build_envelope(
    unsigned: &UnsignedTransaction,
    signers: &[Keypair],
) -> Result<String, CodecError> {
    let hash = unsigned.hash()?;
    let signatures = signers
        .iter()
        .map(|kp| Signer::sign_decorated(kp, &hash))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CodecError::EncodeError(e.to_string()))?;

    TransactionCodec::encode_envelope(unsigned.tx.clone(), signatures)
}

// ============================================================================
// UNSIGNED TRANSACTION
// ============================================================================

/// A composed transaction body bound to the network it will be hashed for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    tx: Transaction,
    network: Network,
}

impl UnsignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn source(&self) -> Address {
        Address::from_muxed_account(&self.tx.source_account)
    }

    pub fn sequence(&self) -> i64 {
        self.tx.seq_num.0
    }

    /// Hash to sign
    pub fn hash(&self) -> Result<[u8; 32], CodecError> {
        compute_hash(&self.tx, self.network.passphrase())
    }

    pub fn to_xdr_base64(&self) -> Result<String, CodecError> {
        TransactionCodec::encode_transaction(&self.tx)
    }

    pub fn into_inner(self) -> Transaction {
        self.tx
    }
}
