// self
use crate::_prelude::*;

/// Broadcaster owning a catalog entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BusinessUnit {
	/// Schweizer Radio und Fernsehen.
	#[default]
	Srf,
	/// Radiotelevisione svizzera.
	Rsi,
	/// Radiotelevisiun Svizra Rumantscha.
	Rtr,
	/// Radio Télévision Suisse.
	Rts,
	/// Swissinfo.
	Swi,
}
impl BusinessUnit {
	/// Every business unit, in catalog order.
	pub const ALL: [Self; 5] = [Self::Srf, Self::Rsi, Self::Rtr, Self::Rts, Self::Swi];

	/// Wire label as returned in `vendor` fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Srf => "SRF",
			Self::Rsi => "RSI",
			Self::Rtr => "RTR",
			Self::Rts => "RTS",
			Self::Swi => "SWI",
		}
	}

	/// Value of the `bu` query parameter.
	pub const fn parameter_value(self) -> &'static str {
		match self {
			Self::Srf => "srf",
			Self::Rsi => "rsi",
			Self::Rtr => "rtr",
			Self::Rts => "rts",
			Self::Swi => "swi",
		}
	}
}
impl Display for BusinessUnit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn wire_and_query_forms_differ_in_case() {
		for unit in BusinessUnit::ALL {
			assert_eq!(unit.parameter_value(), unit.as_str().to_lowercase());
			assert_eq!(
				serde_json::to_string(&unit).expect("Business unit should serialize."),
				format!("\"{unit}\"")
			);
		}

		let parsed: BusinessUnit =
			serde_json::from_str("\"RTS\"").expect("Upper-case vendor should parse.");

		assert_eq!(parsed, BusinessUnit::Rts);
		assert!(serde_json::from_str::<BusinessUnit>("\"rts\"").is_err());
	}
}
