use crate::identity::Address;
use serde::{Deserialize, Serialize};
use stellar_xdr::curr::{
    self as xdr, AllowTrustOp, AlphaNum12, AlphaNum4, AssetCode, AssetCode12, AssetCode4,
    ChangeTrustAsset, ChangeTrustOp, CreateAccountOp, Hash, OperationBody, PathPaymentStrictReceiveOp,
    PaymentOp, StringM, VecM,
};
use thiserror::Error;

/// Maximum memo text length in bytes
pub const MAX_MEMO_TEXT_LEN: usize = 28;

/// Maximum number of intermediate assets in a payment path
pub const MAX_PATH_LEN: usize = 5;

/// Stroops per whole unit (7 decimal places)
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Errors for operation/memo content that cannot be expressed on the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Invalid asset code '{0}': expected 1-12 alphanumeric characters")]
    InvalidAssetCode(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Memo text is {0} bytes, at most 28 allowed")]
    MemoTooLong(usize),

    #[error("Unknown memo type '{0}'")]
    UnknownMemoType(String),

    #[error("Invalid memo value: {0}")]
    InvalidMemoValue(String),

    #[error("Payment path has {0} hops, at most 5 allowed")]
    PathTooLong(usize),
}

// ============================================================================
// ASSET
// ============================================================================

/// An asset held on the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asset {
    /// The network's native currency
    Native,
    /// An issued credit asset
    Credit { code: String, issuer: Address },
}

impl Asset {
    pub fn credit(code: impl Into<String>, issuer: Address) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer,
        }
    }

    pub fn to_xdr(&self) -> Result<xdr::Asset, OperationError> {
        match self {
            Asset::Native => Ok(xdr::Asset::Native),
            Asset::Credit { code, issuer } => match asset_code(code)? {
                AssetCode::CreditAlphanum4(asset_code) => {
                    Ok(xdr::Asset::CreditAlphanum4(AlphaNum4 {
                        asset_code,
                        issuer: issuer.to_account_id(),
                    }))
                }
                AssetCode::CreditAlphanum12(asset_code) => {
                    Ok(xdr::Asset::CreditAlphanum12(AlphaNum12 {
                        asset_code,
                        issuer: issuer.to_account_id(),
                    }))
                }
            },
        }
    }

    fn to_trust_line(&self) -> Result<ChangeTrustAsset, OperationError> {
        Ok(match self.to_xdr()? {
            xdr::Asset::Native => ChangeTrustAsset::Native,
            xdr::Asset::CreditAlphanum4(a) => ChangeTrustAsset::CreditAlphanum4(a),
            xdr::Asset::CreditAlphanum12(a) => ChangeTrustAsset::CreditAlphanum12(a),
        })
    }
}

/// Encode an asset code, choosing the 4 or 12 byte form by length
pub fn asset_code(code: &str) -> Result<AssetCode, OperationError> {
    let valid = !code.is_empty()
        && code.len() <= 12
        && code.bytes().all(|b| b.is_ascii_alphanumeric());
    if !valid {
        return Err(OperationError::InvalidAssetCode(code.to_string()));
    }

    if code.len() <= 4 {
        let mut bytes = [0u8; 4];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(AssetCode::CreditAlphanum4(AssetCode4(bytes)))
    } else {
        let mut bytes = [0u8; 12];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(AssetCode::CreditAlphanum12(AssetCode12(bytes)))
    }
}

// ============================================================================
// OPERATION
// ============================================================================

/// The operations the gateway knows how to build
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateAccount {
        destination: Address,
        starting_balance: i64,
    },
    Payment {
        destination: Address,
        asset: Asset,
        amount: i64,
    },
    /// Path payment where the destination receives exactly `dest_amount`
    PathPayment {
        destination: Address,
        send_asset: Asset,
        send_max: i64,
        dest_asset: Asset,
        dest_amount: i64,
        path: Vec<Asset>,
    },
    ChangeTrust {
        asset: Asset,
        /// `None` trusts up to the maximum amount
        limit: Option<i64>,
    },
    AllowTrust {
        trustor: Address,
        asset_code: String,
        authorize: bool,
    },
}

impl Operation {
    pub fn payment(destination: Address, asset: Asset, amount: i64) -> Self {
        Operation::Payment {
            destination,
            asset,
            amount,
        }
    }

    pub fn allow_trust(trustor: Address, asset_code: impl Into<String>, authorize: bool) -> Self {
        Operation::AllowTrust {
            trustor,
            asset_code: asset_code.into(),
            authorize,
        }
    }

    /// Convert into an XDR operation without an operation-level source account
    pub fn to_xdr(&self) -> Result<xdr::Operation, OperationError> {
        let body = match self {
            Operation::CreateAccount {
                destination,
                starting_balance,
            } => OperationBody::CreateAccount(CreateAccountOp {
                destination: destination.to_account_id(),
                starting_balance: positive(*starting_balance, "starting_balance")?,
            }),
            Operation::Payment {
                destination,
                asset,
                amount,
            } => OperationBody::Payment(PaymentOp {
                destination: destination.to_muxed_account(),
                asset: asset.to_xdr()?,
                amount: positive(*amount, "amount")?,
            }),
            Operation::PathPayment {
                destination,
                send_asset,
                send_max,
                dest_asset,
                dest_amount,
                path,
            } => {
                if path.len() > MAX_PATH_LEN {
                    return Err(OperationError::PathTooLong(path.len()));
                }
                let hops = path
                    .iter()
                    .map(Asset::to_xdr)
                    .collect::<Result<Vec<_>, _>>()?;
                let path: VecM<xdr::Asset, 5> = hops
                    .try_into()
                    .map_err(|_| OperationError::PathTooLong(path.len()))?;

                OperationBody::PathPaymentStrictReceive(PathPaymentStrictReceiveOp {
                    send_asset: send_asset.to_xdr()?,
                    send_max: positive(*send_max, "send_max")?,
                    destination: destination.to_muxed_account(),
                    dest_asset: dest_asset.to_xdr()?,
                    dest_amount: positive(*dest_amount, "dest_amount")?,
                    path,
                })
            }
            Operation::ChangeTrust { asset, limit } => OperationBody::ChangeTrust(ChangeTrustOp {
                line: asset.to_trust_line()?,
                limit: match limit {
                    Some(limit) if *limit < 0 => {
                        return Err(OperationError::InvalidAmount(format!(
                            "limit must not be negative, got {}",
                            limit
                        )))
                    }
                    Some(limit) => *limit,
                    None => i64::MAX,
                },
            }),
            Operation::AllowTrust {
                trustor,
                asset_code: code,
                authorize,
            } => OperationBody::AllowTrust(AllowTrustOp {
                trustor: trustor.to_account_id(),
                asset: asset_code(code)?,
                authorize: u32::from(*authorize),
            }),
        };

        Ok(xdr::Operation {
            source_account: None,
            body,
        })
    }
}

fn positive(amount: i64, field: &str) -> Result<i64, OperationError> {
    if amount <= 0 {
        return Err(OperationError::InvalidAmount(format!(
            "{} must be positive, got {}",
            field, amount
        )));
    }
    Ok(amount)
}

// ============================================================================
// MEMO
// ============================================================================

/// Transaction memo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Memo {
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// Build a memo from a `memo_type` / `memo` request pair
    ///
    /// Hash and return memos are hex encoded.
    pub fn from_type_and_value(memo_type: &str, value: &str) -> Result<Self, OperationError> {
        match memo_type {
            "text" => Ok(Memo::Text(value.to_string())),
            "id" => value
                .parse::<u64>()
                .map(Memo::Id)
                .map_err(|e| OperationError::InvalidMemoValue(e.to_string())),
            "hash" => decode_memo_hash(value).map(Memo::Hash),
            "return" => decode_memo_hash(value).map(Memo::Return),
            other => Err(OperationError::UnknownMemoType(other.to_string())),
        }
    }

    pub fn to_xdr(&self) -> Result<xdr::Memo, OperationError> {
        match self {
            Memo::Text(text) => {
                if text.len() > MAX_MEMO_TEXT_LEN {
                    return Err(OperationError::MemoTooLong(text.len()));
                }
                let text: StringM<28> = text
                    .as_bytes()
                    .to_vec()
                    .try_into()
                    .map_err(|_| OperationError::MemoTooLong(text.len()))?;
                Ok(xdr::Memo::Text(text))
            }
            Memo::Id(id) => Ok(xdr::Memo::Id(*id)),
            Memo::Hash(hash) => Ok(xdr::Memo::Hash(Hash(*hash))),
            Memo::Return(hash) => Ok(xdr::Memo::Return(Hash(*hash))),
        }
    }
}

fn decode_memo_hash(value: &str) -> Result<[u8; 32], OperationError> {
    let bytes = hex::decode(value).map_err(|e| OperationError::InvalidMemoValue(e.to_string()))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        OperationError::InvalidMemoValue(format!("expected 32 bytes, got {}", b.len()))
    })
}

// ============================================================================
// AMOUNTS
// ============================================================================

/// Parse a decimal amount such as "12.5" into stroops
pub fn parse_amount(amount: &str) -> Result<i64, OperationError> {
    let invalid = |reason: &str| OperationError::InvalidAmount(format!("'{}': {}", amount, reason));

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("not a non-negative decimal number"));
    }
    if fraction.len() > 7 {
        return Err(invalid("more than 7 decimal places"));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("too large"))?
    };
    let fraction: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<7}", fraction)
            .parse()
            .map_err(|_| invalid("bad fraction"))?
    };

    whole
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|stroops| stroops.checked_add(fraction))
        .ok_or_else(|| invalid("too large"))
}
