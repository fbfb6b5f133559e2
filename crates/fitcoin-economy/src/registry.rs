//! Identity registry
//!
//! Users and sellers share one id space under `member/<id>`. Every mutation
//! rewrites the full member record.

use fitcoin_core::keys::member_key;
use fitcoin_core::{
    FitcoinError, Invocation, LedgerEffects, Member, MemberId, MemberKind, Result, Seller, User,
};
use tracing::debug;

/// Register a new zero-balance member
pub async fn create_member<L>(
    tx: &mut Invocation<'_, L>,
    id: &MemberId,
    kind: MemberKind,
) -> Result<Member>
where
    L: LedgerEffects + ?Sized,
{
    if id.is_empty() {
        return Err(FitcoinError::invalid_argument("member id must not be empty"));
    }

    let key = member_key(id);
    if tx.get_state(&key).await?.is_some() {
        return Err(FitcoinError::DuplicateId { id: id.to_string() });
    }

    let member = Member::new(id.clone(), kind);
    tx.put_record(key, &member)?;
    debug!(member_id = %id, %kind, "Member registered");
    Ok(member)
}

/// Look up a member and check its role
pub async fn get_member<L>(
    tx: &mut Invocation<'_, L>,
    id: &MemberId,
    expected: MemberKind,
) -> Result<Member>
where
    L: LedgerEffects + ?Sized,
{
    let member: Member = tx
        .get_record(&member_key(id))
        .await?
        .ok_or_else(|| FitcoinError::not_found(format!("{expected} {id}")))?;
    member.expect_kind(expected)
}

/// Look up a user record
pub async fn get_user<L>(tx: &mut Invocation<'_, L>, id: &MemberId) -> Result<User>
where
    L: LedgerEffects + ?Sized,
{
    get_member(tx, id, MemberKind::User).await?.into_user()
}

/// Look up a seller record
pub async fn get_seller<L>(tx: &mut Invocation<'_, L>, id: &MemberId) -> Result<Seller>
where
    L: LedgerEffects + ?Sized,
{
    get_member(tx, id, MemberKind::Seller).await?.into_seller()
}

/// Buffer the full user record
pub fn put_user<L>(tx: &mut Invocation<'_, L>, user: &User) -> Result<()>
where
    L: LedgerEffects + ?Sized,
{
    tx.put_record(member_key(&user.id), &Member::User(user.clone()))
}

/// Buffer the full seller record
pub fn put_seller<L>(tx: &mut Invocation<'_, L>, seller: &Seller) -> Result<()>
where
    L: LedgerEffects + ?Sized,
{
    tx.put_record(member_key(&seller.id), &Member::Seller(seller.clone()))
}
