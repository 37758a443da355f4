// src/common/bookkeeping.rs
//
// Balance propagation as plain data. Every balance-affecting record is
// translated into an `Effects` value; deleting or editing the record applies
// `effects.reversed()`. Services execute effects inside the transaction that
// changes the record.

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{
    balances::BalanceAccount,
    goods::{GoodsDirection, GoodsVariant},
    inventory::StockMovementReason,
    ledger::{LedgerKind, LedgerStatus},
    staff::WageBasis,
};

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

// ---
// GST
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_amount: Decimal,
}

/// The first two characters of a GSTIN are the state code.
pub fn gstin_state_code(gstin: &str) -> Option<String> {
    let code: String = gstin.trim().chars().take(2).collect();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_digit()) {
        Some(code)
    } else {
        None
    }
}

/// A sale or purchase is intra-state unless both sides have a known state and they differ.
pub fn is_intra_state(business_state: Option<&str>, party_gstin: Option<&str>) -> bool {
    match (business_state, party_gstin.and_then(gstin_state_code)) {
        (Some(ours), Some(theirs)) => ours.trim() == theirs,
        _ => true,
    }
}

pub fn compute_tax(
    variant: GoodsVariant,
    quantity: Decimal,
    rate: Decimal,
    gst_rate: Decimal,
    intra_state: bool,
) -> TaxBreakdown {
    let taxable_amount = round_money(quantity * rate);

    if variant == GoodsVariant::Cash || gst_rate.is_zero() {
        return TaxBreakdown {
            taxable_amount,
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: Decimal::ZERO,
            total_amount: taxable_amount,
        };
    }

    let hundred = Decimal::ONE_HUNDRED;
    let (cgst, sgst, igst) = if intra_state {
        let half = round_money(taxable_amount * gst_rate / hundred / Decimal::TWO);
        (half, half, Decimal::ZERO)
    } else {
        (Decimal::ZERO, Decimal::ZERO, round_money(taxable_amount * gst_rate / hundred))
    };

    TaxBreakdown {
        taxable_amount,
        cgst,
        sgst,
        igst,
        total_amount: taxable_amount + cgst + sgst + igst,
    }
}

// ---
// Effects
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEffect {
    pub item_id: Uuid,
    /// Signed: positive adds stock.
    pub quantity: Decimal,
    /// Set when the movement carries value that must be (un)averaged.
    pub unit_price: Option<Decimal>,
    pub reason: StockMovementReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEffect {
    pub account: BalanceAccount,
    /// Signed: positive increases the balance.
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub stock: Vec<StockEffect>,
    pub balance: Vec<BalanceEffect>,
}

impl Effects {
    pub fn reversed(&self) -> Effects {
        Effects {
            stock: self
                .stock
                .iter()
                .map(|e| StockEffect {
                    item_id: e.item_id,
                    quantity: -e.quantity,
                    unit_price: e.unit_price,
                    reason: StockMovementReason::Reversal,
                })
                .collect(),
            balance: self
                .balance
                .iter()
                .map(|e| BalanceEffect { account: e.account, amount: -e.amount })
                .collect(),
        }
    }

    pub fn then(mut self, other: Effects) -> Effects {
        self.stock.extend(other.stock);
        self.balance.extend(other.balance);
        self
    }

    /// Net movement per account, for logging and tests.
    pub fn net_balance(&self, account: BalanceAccount) -> Decimal {
        self.balance
            .iter()
            .filter(|e| e.account == account)
            .map(|e| e.amount)
            .sum()
    }
}

pub fn goods_effects(
    direction: GoodsDirection,
    variant: GoodsVariant,
    item_id: Uuid,
    quantity: Decimal,
    rate: Decimal,
    total_amount: Decimal,
) -> Effects {
    let account = variant.account();
    match direction {
        GoodsDirection::Inward => Effects {
            stock: vec![StockEffect {
                item_id,
                quantity,
                unit_price: Some(rate),
                reason: StockMovementReason::Purchase,
            }],
            balance: vec![BalanceEffect { account, amount: -total_amount }],
        },
        GoodsDirection::Outward => Effects {
            stock: vec![StockEffect {
                item_id,
                quantity: -quantity,
                unit_price: None,
                reason: StockMovementReason::Sale,
            }],
            balance: vec![BalanceEffect { account, amount: total_amount }],
        },
    }
}

pub fn expense_effects(paid_from: BalanceAccount, amount: Decimal) -> Effects {
    Effects {
        stock: vec![],
        balance: vec![BalanceEffect { account: paid_from, amount: -amount }],
    }
}

/// Lending takes money out of the cash box, borrowing puts money in.
pub fn ledger_opening_effects(kind: LedgerKind, amount: Decimal) -> Effects {
    let amount = match kind {
        LedgerKind::Given => -amount,
        LedgerKind::Taken => amount,
    };
    Effects {
        stock: vec![],
        balance: vec![BalanceEffect { account: BalanceAccount::Cash, amount }],
    }
}

pub fn ledger_settlement_effects(kind: LedgerKind, amount: Decimal) -> Effects {
    ledger_opening_effects(kind, amount).reversed()
}

/// Deleting an entry undoes the cash it still has out. Once settled, the
/// opening and the settlement have cancelled out and nothing moves.
pub fn ledger_deletion_effects(kind: LedgerKind, status: LedgerStatus, amount: Decimal) -> Effects {
    match status {
        LedgerStatus::Open => ledger_opening_effects(kind, amount).reversed(),
        LedgerStatus::Settled => Effects::default(),
    }
}

pub fn wage_payment_effects(paid_from: BalanceAccount, amount: Decimal) -> Effects {
    expense_effects(paid_from, amount)
}

// ---
// Stock arithmetic
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockState {
    pub quantity: Decimal,
    pub average_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub available: Decimal,
    pub requested: Decimal,
}

/// Groups stock effects by item, keeping the order in which items and their
/// effects first appear.
pub fn stock_by_item(effects: &[StockEffect]) -> Vec<(Uuid, Vec<&StockEffect>)> {
    let mut groups: Vec<(Uuid, Vec<&StockEffect>)> = Vec::new();
    for effect in effects {
        match groups.iter_mut().find(|(id, _)| *id == effect.item_id) {
            Some((_, group)) => group.push(effect),
            None => groups.push((effect.item_id, vec![effect])),
        }
    }
    groups
}

/// Applies signed quantity changes to one item, in order. Moves with a unit
/// price carry value in or out of the weighted average; moves without one
/// keep it. Stock may dip below zero between moves; only the final quantity
/// must be covered. Rounding happens once, on the result.
pub fn apply_stock(
    state: StockState,
    moves: &[(Decimal, Option<Decimal>)],
) -> Result<StockState, Shortfall> {
    let mut quantity = state.quantity;
    let mut value = state.quantity * state.average_price;
    let mut average = state.average_price;

    for &(delta, unit_price) in moves {
        value += delta * unit_price.unwrap_or(average);
        quantity += delta;
        if quantity.is_zero() {
            value = Decimal::ZERO;
        } else if quantity.is_sign_positive() {
            average = (value / quantity).max(Decimal::ZERO);
        }
    }

    let net_delta: Decimal = moves.iter().map(|(delta, _)| *delta).sum();
    let new_quantity = round_quantity(quantity);
    if new_quantity.is_sign_negative() && !new_quantity.is_zero() {
        return Err(Shortfall {
            available: state.quantity,
            requested: -net_delta,
        });
    }

    if new_quantity.is_zero() {
        return Ok(StockState { quantity: Decimal::ZERO, average_price: Decimal::ZERO });
    }

    Ok(StockState { quantity: new_quantity, average_price: round_money(average) })
}

// ---
// Wages
// ---

/// Half days count as half a paid day; leave and absence are unpaid.
pub fn paid_days(present: i64, half_days: i64) -> Decimal {
    Decimal::from(present) + Decimal::from(half_days) / Decimal::TWO
}

const DAYS_PER_SALARY_MONTH: i64 = 30;

pub fn earned_wage(basis: WageBasis, rate: Decimal, paid_days: Decimal) -> Decimal {
    match basis {
        WageBasis::Daily => round_money(rate * paid_days),
        WageBasis::Monthly => round_money(rate * paid_days / Decimal::from(DAYS_PER_SALARY_MONTH)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn intra_state_gst_splits_evenly() {
        let tax = compute_tax(GoodsVariant::Gst, d("100"), d("50"), d("18"), true);
        assert_eq!(tax.taxable_amount, d("5000"));
        assert_eq!(tax.cgst, d("450"));
        assert_eq!(tax.sgst, d("450"));
        assert_eq!(tax.igst, Decimal::ZERO);
        assert_eq!(tax.total_amount, d("5900"));
    }

    #[test]
    fn inter_state_gst_goes_to_igst() {
        let tax = compute_tax(GoodsVariant::Gst, d("100"), d("50"), d("18"), false);
        assert_eq!(tax.cgst, Decimal::ZERO);
        assert_eq!(tax.igst, d("900"));
        assert_eq!(tax.total_amount, d("5900"));
    }

    #[test]
    fn tax_amounts_round_half_away_from_zero() {
        // 3 × 33.35 = 100.05; 5% → 5.0025, halves 2.50125 → 2.50
        let tax = compute_tax(GoodsVariant::Gst, d("3"), d("33.35"), d("5"), true);
        assert_eq!(tax.taxable_amount, d("100.05"));
        assert_eq!(tax.cgst, d("2.50"));
        assert_eq!(tax.total_amount, d("105.05"));

        let tax = compute_tax(GoodsVariant::Gst, d("1"), d("0.25"), d("18"), false);
        // 0.045 → 0.05
        assert_eq!(tax.igst, d("0.05"));
    }

    #[test]
    fn cash_entries_carry_no_tax() {
        let tax = compute_tax(GoodsVariant::Cash, d("12.5"), d("40"), d("18"), true);
        assert_eq!(tax.total_amount, d("500"));
        assert_eq!(tax.cgst + tax.sgst + tax.igst, Decimal::ZERO);
    }

    #[test]
    fn state_code_comes_from_gstin_prefix() {
        assert_eq!(gstin_state_code("27AAPFU0939F1ZV").as_deref(), Some("27"));
        assert_eq!(gstin_state_code("AB12"), None);
        assert_eq!(gstin_state_code("2"), None);
    }

    #[test]
    fn unknown_states_are_treated_as_intra_state() {
        assert!(is_intra_state(Some("27"), None));
        assert!(is_intra_state(None, Some("29ABCDE1234F1Z5")));
        assert!(is_intra_state(Some("27"), Some("27ABCDE1234F1Z5")));
        assert!(!is_intra_state(Some("27"), Some("29ABCDE1234F1Z5")));
    }

    #[test]
    fn gst_purchase_adds_stock_and_pays_from_bank() {
        let item = Uuid::new_v4();
        let fx = goods_effects(GoodsDirection::Inward, GoodsVariant::Gst, item, d("10"), d("700"), d("8260"));
        assert_eq!(fx.stock[0].quantity, d("10"));
        assert_eq!(fx.stock[0].unit_price, Some(d("700")));
        assert_eq!(fx.net_balance(BalanceAccount::Bank), d("-8260"));
        assert_eq!(fx.net_balance(BalanceAccount::Cash), Decimal::ZERO);
    }

    #[test]
    fn cash_sale_removes_stock_and_fills_cash_box() {
        let item = Uuid::new_v4();
        let fx = goods_effects(GoodsDirection::Outward, GoodsVariant::Cash, item, d("4"), d("45"), d("180"));
        assert_eq!(fx.stock[0].quantity, d("-4"));
        assert_eq!(fx.stock[0].unit_price, None);
        assert_eq!(fx.stock[0].reason, StockMovementReason::Sale);
        assert_eq!(fx.net_balance(BalanceAccount::Cash), d("180"));
    }

    #[test]
    fn reversal_cancels_out() {
        let item = Uuid::new_v4();
        let fx = goods_effects(GoodsDirection::Inward, GoodsVariant::Gst, item, d("10"), d("700"), d("8260"));
        let both = fx.clone().then(fx.reversed());
        assert_eq!(both.net_balance(BalanceAccount::Bank), Decimal::ZERO);
        let qty: Decimal = both.stock.iter().map(|s| s.quantity).sum();
        assert_eq!(qty, Decimal::ZERO);
        assert_eq!(both.stock[1].reason, StockMovementReason::Reversal);
    }

    #[test]
    fn ledger_directions() {
        assert_eq!(ledger_opening_effects(LedgerKind::Given, d("500")).net_balance(BalanceAccount::Cash), d("-500"));
        assert_eq!(ledger_opening_effects(LedgerKind::Taken, d("500")).net_balance(BalanceAccount::Cash), d("500"));
        assert_eq!(ledger_settlement_effects(LedgerKind::Given, d("500")).net_balance(BalanceAccount::Cash), d("500"));
        assert_eq!(ledger_settlement_effects(LedgerKind::Taken, d("500")).net_balance(BalanceAccount::Cash), d("-500"));
    }

    #[test]
    fn deleting_a_ledger_entry_returns_only_outstanding_cash() {
        let open = ledger_deletion_effects(LedgerKind::Given, LedgerStatus::Open, d("500"));
        assert_eq!(open.net_balance(BalanceAccount::Cash), d("500"));

        let settled = ledger_deletion_effects(LedgerKind::Taken, LedgerStatus::Settled, d("500"));
        assert!(settled.balance.is_empty());

        // Borrow, repay, delete: the cash box ends where it started.
        let lifecycle = ledger_opening_effects(LedgerKind::Taken, d("500"))
            .then(ledger_settlement_effects(LedgerKind::Taken, d("500")))
            .then(settled);
        assert_eq!(lifecycle.net_balance(BalanceAccount::Cash), Decimal::ZERO);
    }

    #[test]
    fn purchase_reaverages_price() {
        let state = StockState { quantity: d("100"), average_price: d("40") };
        let next = apply_stock(state, &[(d("50"), Some(d("46")))]).unwrap();
        assert_eq!(next.quantity, d("150"));
        assert_eq!(next.average_price, d("42"));
    }

    #[test]
    fn reversing_a_purchase_restores_previous_average() {
        let start = StockState { quantity: d("100"), average_price: d("40") };
        let bought = apply_stock(start, &[(d("50"), Some(d("46")))]).unwrap();
        let undone = apply_stock(bought, &[(d("-50"), Some(d("46")))]).unwrap();
        assert_eq!(undone, start);
    }

    #[test]
    fn sale_keeps_average() {
        let state = StockState { quantity: d("100"), average_price: d("40") };
        let next = apply_stock(state, &[(d("-30"), None)]).unwrap();
        assert_eq!(next.quantity, d("70"));
        assert_eq!(next.average_price, d("40"));
    }

    #[test]
    fn selling_everything_resets_average() {
        let state = StockState { quantity: d("12.5"), average_price: d("40") };
        let next = apply_stock(state, &[(d("-12.5"), None)]).unwrap();
        assert_eq!(next, StockState { quantity: Decimal::ZERO, average_price: Decimal::ZERO });
    }

    #[test]
    fn overselling_reports_shortfall() {
        let state = StockState { quantity: d("5"), average_price: d("40") };
        let err = apply_stock(state, &[(d("-8"), None)]).unwrap_err();
        assert_eq!(err, Shortfall { available: d("5"), requested: d("8") });
    }

    #[test]
    fn editing_the_only_purchase_lands_on_the_new_price() {
        let item = Uuid::new_v4();
        let old = goods_effects(GoodsDirection::Inward, GoodsVariant::Cash, item, d("10"), d("700"), d("7000"));
        let new = goods_effects(GoodsDirection::Inward, GoodsVariant::Cash, item, d("5"), d("800"), d("4000"));
        let edit = old.reversed().then(new);

        let groups = stock_by_item(&edit.stock);
        assert_eq!(groups.len(), 1);
        let moves: Vec<_> = groups[0].1.iter().map(|e| (e.quantity, e.unit_price)).collect();

        let state = StockState { quantity: d("10"), average_price: d("700") };
        let next = apply_stock(state, &moves).unwrap();
        assert_eq!(next, StockState { quantity: d("5"), average_price: d("800") });
    }

    #[test]
    fn stock_may_dip_between_moves_when_the_net_is_covered() {
        // 10 bought, 5 sold since; the purchase is raised to 15.
        let state = StockState { quantity: d("5"), average_price: d("700") };
        let next = apply_stock(state, &[(d("-10"), Some(d("700"))), (d("15"), Some(d("700")))]).unwrap();
        assert_eq!(next, StockState { quantity: d("10"), average_price: d("700") });
    }

    #[test]
    fn raising_a_sale_beyond_stock_reports_the_net_shortfall() {
        let item = Uuid::new_v4();
        let old = goods_effects(GoodsDirection::Outward, GoodsVariant::Cash, item, d("10"), d("900"), d("9000"));
        let new = goods_effects(GoodsDirection::Outward, GoodsVariant::Cash, item, d("12"), d("900"), d("10800"));
        let edit = old.reversed().then(new);
        let moves: Vec<_> = edit.stock.iter().map(|e| (e.quantity, e.unit_price)).collect();

        let state = StockState { quantity: Decimal::ZERO, average_price: Decimal::ZERO };
        let err = apply_stock(state, &moves).unwrap_err();
        assert_eq!(err, Shortfall { available: Decimal::ZERO, requested: d("2") });
    }

    #[test]
    fn stock_effects_are_grouped_per_item_in_order() {
        let copper = Uuid::new_v4();
        let brass = Uuid::new_v4();
        let old = goods_effects(GoodsDirection::Outward, GoodsVariant::Gst, copper, d("3"), d("700"), d("2478"));
        let new = goods_effects(GoodsDirection::Outward, GoodsVariant::Gst, brass, d("3"), d("450"), d("1593"));
        let edit = old.reversed().then(new.clone()).then(new);

        let groups = stock_by_item(&edit.stock);
        assert_eq!(groups.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![copper, brass]);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[1].1.len(), 2);
    }

    #[test]
    fn unaveraging_never_goes_negative() {
        // Price fell in between: removing an expensive purchase could drive the average below zero.
        let state = StockState { quantity: d("10"), average_price: d("1") };
        let next = apply_stock(state, &[(d("-5"), Some(d("100")))]).unwrap();
        assert_eq!(next.average_price, Decimal::ZERO);
    }

    #[test]
    fn wages_by_basis() {
        let days = paid_days(22, 3);
        assert_eq!(days, d("23.5"));
        assert_eq!(earned_wage(WageBasis::Daily, d("650"), days), d("15275"));
        assert_eq!(earned_wage(WageBasis::Monthly, d("18000"), d("30")), d("18000"));
        assert_eq!(earned_wage(WageBasis::Monthly, d("18000"), days), d("14100"));
    }
}
