//! Servicio de precios
//!
//! Cálculo del coste de un alquiler (tarifas por hora, día y semana),
//! cargos adicionales al devolver el vehículo y política de reembolso
//! por cancelación. Todo el módulo es lógica pura sin acceso a base de datos.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: i64 = 3_600;
const HOURS_PER_DAY: i64 = 24;
const HOURS_PER_WEEK: i64 = 168;

/// Parámetros de precios configurables por entorno
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    pub tax_rate: Decimal,
    pub discount_code_rate: Decimal,
    pub late_fee_multiplier: Decimal,
    pub free_charge_drop_percent: i32,
    pub recharge_fee_per_percent: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2),
            discount_code_rate: Decimal::new(10, 2),
            late_fee_multiplier: Decimal::new(15, 1),
            free_charge_drop_percent: 20,
            recharge_fee_per_percent: Decimal::new(50, 2),
        }
    }
}

/// Tarifas de un vehículo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentalRates {
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
}

impl RentalRates {
    /// Tarifa semanal efectiva (7 días si el vehículo no define una)
    pub fn effective_weekly_rate(&self) -> Decimal {
        self.weekly_rate.unwrap_or(self.daily_rate * Decimal::from(7))
    }
}

/// Desglose del coste de una reserva
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub rental_cost: Decimal,
    pub discount: Decimal,
    pub tax_amount: Decimal,
    pub total_cost: Decimal,
}

/// Tipo de cargo adicional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeType {
    LateReturn,
    RechargeFee,
    Damage,
}

/// Cargo adicional aplicado al completar un alquiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCharge {
    #[serde(rename = "type")]
    pub charge_type: ChargeType,
    pub description: String,
    pub amount: Decimal,
}

/// Estado del reembolso tras una cancelación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    None,
    Processing,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::None => "NONE",
            RefundStatus::Processing => "PROCESSING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    pub amount: Decimal,
    pub status: RefundStatus,
}

impl PricingPolicy {
    /// Coste base por duración, en horas completas
    ///
    /// - hasta 24h: tarifa por hora (mínimo 1 hora)
    /// - hasta 7 días: tarifa diaria (mínimo 1 día)
    /// - más: semanas completas más los días restantes
    pub fn base_rental_cost(
        &self,
        rates: &RentalRates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Decimal {
        let seconds = (end - start).num_seconds().max(0);
        let hours = seconds / SECONDS_PER_HOUR;

        let cost = if seconds <= HOURS_PER_DAY * SECONDS_PER_HOUR {
            rates.hourly_rate * Decimal::from(hours.max(1))
        } else if seconds <= HOURS_PER_WEEK * SECONDS_PER_HOUR {
            rates.daily_rate * Decimal::from((hours / HOURS_PER_DAY).max(1))
        } else {
            let weeks = hours / HOURS_PER_WEEK;
            let days = (hours % HOURS_PER_WEEK) / HOURS_PER_DAY;
            rates.effective_weekly_rate() * Decimal::from(weeks)
                + rates.daily_rate * Decimal::from(days)
        };

        cost.round_dp(2)
    }

    /// Presupuesto completo con descuento e impuestos
    pub fn quote(
        &self,
        rates: &RentalRates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        discount_code: Option<&str>,
    ) -> CostBreakdown {
        let rental_cost = self.base_rental_cost(rates, start, end);

        let discount = match discount_code.map(str::trim) {
            Some(code) if !code.is_empty() => (rental_cost * self.discount_code_rate).round_dp(2),
            _ => Decimal::ZERO,
        };

        let tax_amount = ((rental_cost - discount) * self.tax_rate).round_dp(2);
        let total_cost = (rental_cost - discount + tax_amount).round_dp(2);

        CostBreakdown {
            rental_cost,
            discount,
            tax_amount,
            total_cost,
        }
    }

    /// Recargo por devolución tardía, proporcional al tiempo de retraso
    pub fn late_return_fee(
        &self,
        hourly_rate: Decimal,
        end_date: DateTime<Utc>,
        returned_at: DateTime<Utc>,
    ) -> Option<AdditionalCharge> {
        if returned_at <= end_date {
            return None;
        }

        let seconds_late = (returned_at - end_date).num_seconds();
        let hours_late = Decimal::from(seconds_late) / Decimal::from(SECONDS_PER_HOUR);
        let amount = (hours_late * hourly_rate * self.late_fee_multiplier).round_dp(2);

        if amount <= Decimal::ZERO {
            return None;
        }

        Some(AdditionalCharge {
            charge_type: ChargeType::LateReturn,
            description: format!("Late return fee ({} hours)", seconds_late / SECONDS_PER_HOUR),
            amount,
        })
    }

    /// Recargo por batería consumida por encima del margen gratuito
    pub fn recharge_fee(
        &self,
        initial_level: Option<i32>,
        final_level: Option<i32>,
    ) -> Option<AdditionalCharge> {
        let drop = initial_level? - final_level?;
        if drop <= self.free_charge_drop_percent {
            return None;
        }

        let billable = Decimal::from(drop - self.free_charge_drop_percent);
        Some(AdditionalCharge {
            charge_type: ChargeType::RechargeFee,
            description: format!("Battery recharge fee ({}% used)", drop),
            amount: (billable * self.recharge_fee_per_percent).round_dp(2),
        })
    }

    /// Total final tras sumar los cargos adicionales
    pub fn final_total(&self, breakdown: &CostBreakdown, charges: &[AdditionalCharge]) -> Decimal {
        let extra: Decimal = charges.iter().map(|c| c.amount).sum();
        (breakdown.total_cost + extra).round_dp(2)
    }

    /// Reembolso según la antelación de la cancelación
    pub fn refund_for_cancellation(
        &self,
        total_paid: Decimal,
        start_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Refund {
        let until_start = start_date - now;

        if until_start > Duration::days(7) {
            Refund {
                amount: total_paid.round_dp(2),
                status: RefundStatus::Processing,
            }
        } else if until_start > Duration::days(2) {
            Refund {
                amount: (total_paid * Decimal::new(5, 1)).round_dp(2),
                status: RefundStatus::Processing,
            }
        } else {
            Refund {
                amount: Decimal::ZERO,
                status: RefundStatus::None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rates() -> RentalRates {
        RentalRates {
            hourly_rate: Decimal::new(1000, 2),
            daily_rate: Decimal::new(5000, 2),
            weekly_rate: Some(Decimal::new(30000, 2)),
        }
    }

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    #[test]
    fn test_hourly_pricing_with_one_hour_minimum() {
        let policy = PricingPolicy::default();
        let start = at(0);

        assert_eq!(policy.base_rental_cost(&rates(), start, start + Duration::minutes(20)), Decimal::from(10));
        assert_eq!(policy.base_rental_cost(&rates(), start, at(5)), Decimal::from(50));
        assert_eq!(
            policy.base_rental_cost(&rates(), start, at(5) + Duration::minutes(59)),
            Decimal::from(50)
        );
        assert_eq!(policy.base_rental_cost(&rates(), start, at(24)), Decimal::from(240));
    }

    #[test]
    fn test_daily_pricing_truncates_partial_days() {
        let policy = PricingPolicy::default();

        assert_eq!(policy.base_rental_cost(&rates(), at(0), at(25)), Decimal::from(50));
        assert_eq!(policy.base_rental_cost(&rates(), at(0), at(71)), Decimal::from(100));
        assert_eq!(policy.base_rental_cost(&rates(), at(0), at(168)), Decimal::from(350));
    }

    #[test]
    fn test_weekly_pricing_adds_remaining_days() {
        let policy = PricingPolicy::default();

        // 8 días y 5 horas: 1 semana + 1 día
        assert_eq!(policy.base_rental_cost(&rates(), at(0), at(197)), Decimal::from(350));
        // 14 días exactos
        assert_eq!(policy.base_rental_cost(&rates(), at(0), at(336)), Decimal::from(600));
    }

    #[test]
    fn test_missing_weekly_rate_falls_back_to_seven_days() {
        let policy = PricingPolicy::default();
        let no_weekly = RentalRates {
            weekly_rate: None,
            ..rates()
        };

        assert_eq!(policy.base_rental_cost(&no_weekly, at(0), at(192)), Decimal::from(400));
    }

    #[test]
    fn test_quote_with_and_without_discount_code() {
        let policy = PricingPolicy::default();

        let plain = policy.quote(&rates(), at(0), at(48), None);
        assert_eq!(plain.rental_cost, Decimal::from(100));
        assert_eq!(plain.discount, Decimal::ZERO);
        assert_eq!(plain.tax_amount, Decimal::from(10));
        assert_eq!(plain.total_cost, Decimal::from(110));

        let discounted = policy.quote(&rates(), at(0), at(48), Some("SPRING"));
        assert_eq!(discounted.discount, Decimal::from(10));
        assert_eq!(discounted.tax_amount, Decimal::from(9));
        assert_eq!(discounted.total_cost, Decimal::from(99));

        let blank = policy.quote(&rates(), at(0), at(48), Some("   "));
        assert_eq!(blank.discount, Decimal::ZERO);
    }

    #[test]
    fn test_late_return_fee() {
        let policy = PricingPolicy::default();
        let end = at(10);

        assert!(policy.late_return_fee(Decimal::from(10), end, end).is_none());
        assert!(policy.late_return_fee(Decimal::from(10), end, at(9)).is_none());

        let charge = policy
            .late_return_fee(Decimal::from(10), end, at(12) + Duration::minutes(30))
            .unwrap();
        assert_eq!(charge.charge_type, ChargeType::LateReturn);
        assert_eq!(charge.description, "Late return fee (2 hours)");
        assert_eq!(charge.amount, Decimal::new(3750, 2));
    }

    #[test]
    fn test_recharge_fee_over_free_margin() {
        let policy = PricingPolicy::default();

        assert!(policy.recharge_fee(Some(90), Some(70)).is_none());
        assert!(policy.recharge_fee(None, Some(10)).is_none());
        assert!(policy.recharge_fee(Some(90), None).is_none());

        let charge = policy.recharge_fee(Some(90), Some(40)).unwrap();
        assert_eq!(charge.charge_type, ChargeType::RechargeFee);
        assert_eq!(charge.description, "Battery recharge fee (50% used)");
        assert_eq!(charge.amount, Decimal::from(15));
    }

    #[test]
    fn test_final_total_sums_charges() {
        let policy = PricingPolicy::default();
        let breakdown = policy.quote(&rates(), at(0), at(48), None);
        let charges = vec![
            policy.recharge_fee(Some(100), Some(50)).unwrap(),
            policy.late_return_fee(Decimal::from(10), at(48), at(49)).unwrap(),
        ];

        assert_eq!(policy.final_total(&breakdown, &[]), Decimal::from(110));
        assert_eq!(policy.final_total(&breakdown, &charges), Decimal::from(140));
    }

    #[test]
    fn test_refund_policy_tiers() {
        let policy = PricingPolicy::default();
        let now = at(0);
        let paid = Decimal::new(20000, 2);

        let full = policy.refund_for_cancellation(paid, now + Duration::days(8), now);
        assert_eq!(full.amount, Decimal::from(200));
        assert_eq!(full.status, RefundStatus::Processing);

        let half = policy.refund_for_cancellation(paid, now + Duration::days(3), now);
        assert_eq!(half.amount, Decimal::from(100));
        assert_eq!(half.status, RefundStatus::Processing);

        let exactly_two_days = policy.refund_for_cancellation(paid, now + Duration::days(2), now);
        assert_eq!(exactly_two_days.amount, Decimal::ZERO);
        assert_eq!(exactly_two_days.status, RefundStatus::None);
    }

    #[test]
    fn test_additional_charge_serializes_with_type_key() {
        let charge = AdditionalCharge {
            charge_type: ChargeType::LateReturn,
            description: "Late return fee (1 hours)".to_string(),
            amount: Decimal::from(15),
        };

        let value = serde_json::to_value(&charge).unwrap();
        assert_eq!(value["type"], "LATE_RETURN");
        let back: AdditionalCharge = serde_json::from_value(value).unwrap();
        assert_eq!(back, charge);
    }
}
