//! Member service for business logic operations.
//!
//! Owns the member rules: required fields, unique phone numbers and the
//! balance movements that also write a ledger entry.

use std::sync::Arc;

use dashmap::DashMap;
use jiff::Zoned;
use tokio::sync::Mutex;
use validator::Validate;

use super::require_id;
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::external::vika::Fields;
use crate::models::fields::{self, round_cents};
use crate::models::member::field;
use crate::models::{
    Consume, ConsumeOutcome, LedgerKind, Member, MemberPatch, NewLedgerEntry, NewMember, Recharge,
    RechargeOutcome,
};
use crate::repositories::{LedgerRepository, MemberRepository};

/// Member service handling member CRUD and balance movements.
///
/// Cloning is cheap; repositories share one gateway and clones share the
/// per-member balance locks.
#[derive(Clone)]
pub struct MemberService {
    members: MemberRepository,
    ledger: LedgerRepository,
    balance_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl MemberService {
    pub fn new(members: MemberRepository, ledger: LedgerRepository) -> Self {
        Self {
            members,
            ledger,
            balance_locks: Arc::new(DashMap::new()),
        }
    }

    /// Queries one page of members.
    ///
    /// # Arguments
    /// * `view_id` - View to read; the configured one when `None`
    /// * `formula` - Raw `filterByFormula` passed through to the sheet
    /// * `max_records` - Upper bound on returned members
    pub async fn query_members(
        &self,
        view_id: Option<String>,
        formula: Option<String>,
        max_records: Option<u32>,
    ) -> Envelope<Vec<Member>> {
        Envelope::from_result(
            self.members.query(view_id, formula, max_records).await,
            "Members retrieved",
        )
    }

    /// Lists every member, following pagination to the end.
    pub async fn list_all_members(&self) -> Envelope<Vec<Member>> {
        Envelope::from_result(self.members.list_all().await, "Members retrieved")
    }

    /// Gets a member by record id.
    ///
    /// # Returns
    /// The member, or a `not-found` failure
    pub async fn get_member(&self, record_id: &str) -> Envelope<Member> {
        Envelope::from_result(self.find_member(record_id).await, "Member retrieved")
    }

    /// Creates a member after checking the phone number is not taken.
    ///
    /// # Returns
    /// The stored member, `validation` for missing fields or `conflict` for
    /// a phone already registered
    pub async fn create_member(&self, new_member: NewMember) -> Envelope<Member> {
        Envelope::from_result(self.try_create(new_member).await, "Member created")
    }

    /// Applies a partial update to a member.
    ///
    /// A changed phone number must not belong to another member.
    pub async fn update_member(&self, record_id: &str, patch: MemberPatch) -> Envelope<Member> {
        Envelope::from_result(self.try_update(record_id, patch).await, "Member updated")
    }

    pub async fn delete_member(&self, record_id: &str) -> Envelope<()> {
        let result = match require_id(record_id) {
            Ok(id) => self.members.delete(id).await,
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Member deleted")
    }

    /// Adds `amount` to a member's balance and records a `充值` ledger entry.
    ///
    /// The ledger entry is written after the balance update and in the
    /// background; if that write fails the balance change stands and the
    /// failure is only logged.
    pub async fn recharge_member(
        &self,
        record_id: &str,
        recharge: Recharge,
    ) -> Envelope<RechargeOutcome> {
        let result = self
            .move_balance(record_id, &recharge, LedgerKind::Recharge, recharge.amount, None)
            .await
            .map(|m| RechargeOutcome {
                member_name: m.member_name,
                recharge_amount: m.amount,
                previous_balance: m.previous_balance,
                new_balance: m.new_balance,
            });
        Envelope::from_result(result, "Recharge completed")
    }

    /// Deducts `amount` from a member's balance and records a `消费` entry.
    ///
    /// Fails with `insufficient-funds` when the balance does not cover it.
    pub async fn consume_member(
        &self,
        record_id: &str,
        consume: Consume,
    ) -> Envelope<ConsumeOutcome> {
        let details = consume.product_details.clone();
        let result = self
            .move_balance(record_id, &consume, LedgerKind::Consume, consume.amount, details)
            .await
            .map(|m| ConsumeOutcome {
                member_name: m.member_name,
                consume_amount: m.amount,
                previous_balance: m.previous_balance,
                new_balance: m.new_balance,
            });
        Envelope::from_result(result, "Consumption completed")
    }

    async fn find_member(&self, record_id: &str) -> AppResult<Member> {
        let id = require_id(record_id)?;
        self.members
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("member", "recordId", id))
    }

    async fn try_create(&self, new_member: NewMember) -> AppResult<Member> {
        new_member.validate()?;
        self.ensure_phone_free(&new_member.phone, None).await?;
        let member = self.members.create(&new_member).await?;
        tracing::info!(record_id = %member.record_id, "Member created");
        Ok(member)
    }

    async fn try_update(&self, record_id: &str, patch: MemberPatch) -> AppResult<Member> {
        let id = require_id(record_id)?;
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::validation("body", "No fields to update"));
        }
        if let Some(phone) = &patch.phone {
            self.ensure_phone_free(phone, Some(id)).await?;
        }
        self.members.update(id, patch.to_fields()).await
    }

    async fn ensure_phone_free(&self, phone: &str, except: Option<&str>) -> AppResult<()> {
        let taken = self
            .members
            .find_by_phone(phone)
            .await?
            .into_iter()
            .any(|m| Some(m.record_id.as_str()) != except);
        if taken {
            return Err(AppError::Duplicate {
                entity: "member".to_string(),
                field: "phone".to_string(),
                value: phone.trim().to_string(),
            });
        }
        Ok(())
    }

    async fn move_balance(
        &self,
        record_id: &str,
        input: &(impl Validate + Sync),
        kind: LedgerKind,
        amount: f64,
        product_details: Option<String>,
    ) -> AppResult<BalanceMove> {
        let id = require_id(record_id)?;
        input.validate()?;

        let lock = self.balance_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.apply_move(id, kind, amount, product_details).await
        };
        drop(lock);
        self.balance_locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Lock serializing balance movements of one member.
    fn balance_lock(&self, record_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.balance_locks
                .entry(record_id.to_string())
                .or_default()
                .value(),
        )
    }

    /// Read, check and write of one movement. Callers hold the member's
    /// balance lock, and the balance is read from the sheet, not the cache.
    async fn apply_move(
        &self,
        id: &str,
        kind: LedgerKind,
        amount: f64,
        product_details: Option<String>,
    ) -> AppResult<BalanceMove> {
        let member = self
            .members
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("member", "recordId", id))?;
        let previous_balance = member.balance;
        let new_balance = match kind {
            LedgerKind::Recharge => round_cents(previous_balance + amount),
            LedgerKind::Consume if previous_balance < amount => {
                return Err(AppError::InsufficientFunds {
                    balance: previous_balance,
                    required: amount,
                });
            }
            LedgerKind::Consume => round_cents(previous_balance - amount),
        };

        let mut balance = Fields::new();
        fields::put(&mut balance, field::BALANCE, new_balance);
        self.members.update(id, balance).await?;
        tracing::info!(
            record_id = %id,
            kind = ?kind,
            amount,
            previous_balance,
            new_balance,
            "Member balance changed"
        );

        let entry = NewLedgerEntry::movement(
            &member.name,
            &member.phone,
            kind,
            amount,
            product_details,
            &Zoned::now(),
        );
        let ledger = self.ledger.clone();
        let member_id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = ledger.create(std::slice::from_ref(&entry)).await {
                tracing::error!(
                    record_id = %member_id,
                    record = %entry.record,
                    error = %e,
                    "Balance changed but ledger entry was not written"
                );
            }
        });

        Ok(BalanceMove {
            member_name: member.name,
            amount,
            previous_balance,
            new_balance,
        })
    }
}

struct BalanceMove {
    member_name: String,
    amount: f64,
    previous_balance: f64,
    new_balance: f64,
}
