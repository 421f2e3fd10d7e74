use serde::Deserialize;

// ============================================================================
// NUMERIC VALUES
// ============================================================================

/// A decimal as it arrived on the wire.
///
/// The backend serialises `BigDecimal` as JSON numbers, but hand-edited
/// records and older exports carry numeric strings. The raw form is kept and
/// only parsed when a cell is formatted.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Parse to a finite float; `None` for blank, non-numeric or NaN input.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(v) => *v,
            Numeric::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Number(v)
    }
}

impl From<&str> for Numeric {
    fn from(v: &str) -> Self {
        Numeric::Text(v.to_string())
    }
}

// Accepts both JSON numbers and strings like "12.30"
impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct NumericVisitor;

        impl<'de> Visitor<'de> for NumericVisitor {
            type Value = Numeric;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a number or a numeric string")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Numeric::Number(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Numeric::Number(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Numeric::Number(v as f64))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Numeric::Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(NumericVisitor)
    }
}

// ============================================================================
// COUNTS
// ============================================================================

// Counts arrive as integers, integral floats ("2.0") or numeric strings.
// Anything else, fractional values included, reads as missing.
struct CountVisitor;

impl<'de> serde::de::Visitor<'de> for CountVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an integer count")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Some(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(i64::try_from(v).ok())
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(integral(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let trimmed = v.trim();
        Ok(trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| trimmed.parse::<f64>().ok().and_then(integral)))
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(CountVisitor)
    }
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

/// Lenient `deserialize_with` for optional integer counts.
fn count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = deserializer.deserialize_any(CountVisitor)?;
    Ok(value.and_then(|v| T::try_from(v).ok()))
}

// ============================================================================
// SHIPMENT RECORD
// ============================================================================

/// Name, address and contact of one trading party.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Party {
    pub company_name: String,
    pub address: String,
    pub contact_person: String,
    pub phone: String,
}

/// One package line of the Marks columns.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxEntry {
    pub title: Option<String>,
    pub width: Option<Numeric>,
    pub length: Option<Numeric>,
    pub height: Option<Numeric>,
    pub dimension_string: Option<String>,
    #[serde(deserialize_with = "count")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    #[serde(deserialize_with = "count")]
    pub sequence: Option<u32>,
    pub product_code: Option<String>,
    pub model: Option<String>,
    pub product_description: Option<String>,
    pub description: Option<String>,
    pub hs_code: Option<String>,
    #[serde(deserialize_with = "count")]
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub unit_price: Option<Numeric>,
    pub amount: Option<Numeric>,
    pub net_weight: Option<Numeric>,
    pub gross_weight: Option<Numeric>,
    pub cbm: Option<Numeric>,
}

impl LineItem {
    /// Product code, falling back to the legacy `model` field.
    pub fn model_label(&self) -> &str {
        non_blank(self.product_code.as_deref())
            .or_else(|| non_blank(self.model.as_deref()))
            .unwrap_or("")
    }

    pub fn description_label(&self) -> &str {
        non_blank(self.product_description.as_deref())
            .or_else(|| non_blank(self.description.as_deref()))
            .unwrap_or("")
    }
}

/// Totals supplied by the caller. The generator never recomputes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub quantity: Option<i64>,
    pub amount: Option<Numeric>,
    pub net_weight: Option<Numeric>,
    pub gross_weight: Option<Numeric>,
    pub cbm: Option<Numeric>,
}

/// A fully resolved shipment, ready to be laid out.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(from = "ShipmentRecord")]
pub struct ShipmentDocument {
    pub invoice_number: String,
    pub invoice_date: String,
    pub freight_date: String,
    pub currency: String,

    pub shipper: Party,
    pub sold_to: Party,
    pub ship_to: Party,

    pub port_of_loading: String,
    pub final_destination: String,
    pub carrier_name: String,
    pub lc_no: String,
    pub lc_date: String,
    pub lc_issuing_bank: String,
    pub shipment_type: String,
    pub trade_terms: String,
    pub origin_description: String,
    pub additional_remarks: String,

    pub boxes: Vec<BoxEntry>,
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

/// Flat camelCase shape of the backend's shipment response.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ShipmentRecord {
    invoice_number: Option<String>,
    invoice_date: Option<String>,
    freight_date: Option<String>,
    currency: Option<String>,

    shipper_company_name: Option<String>,
    shipper_address: Option<String>,
    shipper_contact_person: Option<String>,
    shipper_phone: Option<String>,

    sold_to_company_name: Option<String>,
    sold_to_address: Option<String>,
    sold_to_contact_person: Option<String>,
    sold_to_phone: Option<String>,

    ship_to_company_name: Option<String>,
    ship_to_address: Option<String>,
    ship_to_contact_person: Option<String>,
    ship_to_phone: Option<String>,

    port_of_loading: Option<String>,
    final_destination: Option<String>,
    carrier_name: Option<String>,
    lc_no: Option<String>,
    lc_date: Option<String>,
    lc_issuing_bank: Option<String>,
    shipment_type_display_en: Option<String>,
    trade_terms_display_en: Option<String>,
    origin_description: Option<String>,
    additional_remarks: Option<String>,

    boxes: Option<Vec<BoxEntry>>,
    items: Option<Vec<LineItem>>,

    #[serde(deserialize_with = "count")]
    total_quantity: Option<i64>,
    total_amount: Option<Numeric>,
    total_net_weight: Option<Numeric>,
    total_gross_weight: Option<Numeric>,
    total_cbm: Option<Numeric>,
}

impl From<ShipmentRecord> for ShipmentDocument {
    fn from(r: ShipmentRecord) -> Self {
        ShipmentDocument {
            invoice_number: r.invoice_number.unwrap_or_default(),
            invoice_date: r.invoice_date.unwrap_or_default(),
            freight_date: r.freight_date.unwrap_or_default(),
            currency: r.currency.unwrap_or_default(),
            shipper: Party {
                company_name: r.shipper_company_name.unwrap_or_default(),
                address: r.shipper_address.unwrap_or_default(),
                contact_person: r.shipper_contact_person.unwrap_or_default(),
                phone: r.shipper_phone.unwrap_or_default(),
            },
            sold_to: Party {
                company_name: r.sold_to_company_name.unwrap_or_default(),
                address: r.sold_to_address.unwrap_or_default(),
                contact_person: r.sold_to_contact_person.unwrap_or_default(),
                phone: r.sold_to_phone.unwrap_or_default(),
            },
            ship_to: Party {
                company_name: r.ship_to_company_name.unwrap_or_default(),
                address: r.ship_to_address.unwrap_or_default(),
                contact_person: r.ship_to_contact_person.unwrap_or_default(),
                phone: r.ship_to_phone.unwrap_or_default(),
            },
            port_of_loading: r.port_of_loading.unwrap_or_default(),
            final_destination: r.final_destination.unwrap_or_default(),
            carrier_name: r.carrier_name.unwrap_or_default(),
            lc_no: r.lc_no.unwrap_or_default(),
            lc_date: r.lc_date.unwrap_or_default(),
            lc_issuing_bank: r.lc_issuing_bank.unwrap_or_default(),
            shipment_type: r.shipment_type_display_en.unwrap_or_default(),
            trade_terms: r.trade_terms_display_en.unwrap_or_default(),
            origin_description: r.origin_description.unwrap_or_default(),
            additional_remarks: r.additional_remarks.unwrap_or_default(),
            boxes: r.boxes.unwrap_or_default(),
            items: r.items.unwrap_or_default(),
            totals: Totals {
                quantity: r.total_quantity,
                amount: r.total_amount,
                net_weight: r.total_net_weight,
                gross_weight: r.total_gross_weight,
                cbm: r.total_cbm,
            },
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
