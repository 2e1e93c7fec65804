//! Integration Tests for Feature Extraction
//!
//! Extractor + schema + record conversions working together.

#[cfg(test)]
mod integration_tests {
    use serde_json::json;

    use crate::logic::error::ModelError;
    use crate::logic::features::{
        credit_schema, transaction_schema, CreditProfile, DecodePolicy, FeatureExtractor,
        FeatureSchema, Record,
    };

    /// Missing fields get the declared default, length always matches schema
    #[test]
    fn test_missing_fields_use_defaults() {
        let schema = FeatureSchema::new(
            "custom",
            1,
            vec![("a", 1.0), ("b", 2.5), ("c", -3.0)],
        );
        let extractor = FeatureExtractor::new(schema.clone());

        let vector = extractor.extract(&Record::new().with("b", 10.0)).unwrap();

        assert_eq!(vector.len(), schema.len());
        assert_eq!(vector.values, vec![1.0, 10.0, -3.0]);
    }

    #[test]
    fn test_empty_record_is_all_defaults() {
        let extractor = FeatureExtractor::new(transaction_schema());
        let vector = extractor.extract(&Record::new()).unwrap();
        assert_eq!(vector.values, vec![0.0; 4]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let extractor = FeatureExtractor::new(transaction_schema());
        let record = Record::from_json(json!({
            "amount": 50,
            "merchant": "ACME",
            "hour_of_day": 10,
        }));
        let vector = extractor.extract(&record).unwrap();
        assert_eq!(vector.values, vec![50.0, 10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_lenient_policy_defaults_malformed() {
        let extractor = FeatureExtractor::new(transaction_schema());
        let record = Record::from_json(json!({"amount": "lots", "hour_of_day": "7"}));
        let vector = extractor.extract(&record).unwrap();
        assert_eq!(vector.values, vec![0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_strict_policy_rejects_malformed() {
        let extractor = FeatureExtractor::with_policy(transaction_schema(), DecodePolicy::Strict);
        let record = Record::from_json(json!({"amount": "lots"}));

        match extractor.extract(&record) {
            Err(ModelError::MalformedRecord { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_policy_still_defaults_missing_and_null() {
        let extractor = FeatureExtractor::with_policy(transaction_schema(), DecodePolicy::Strict);
        let record = Record::from_json(json!({"amount": 12.0, "day_of_week": null}));
        let vector = extractor.extract(&record).unwrap();
        assert_eq!(vector.values, vec![12.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_typed_profile_roundtrips_through_extractor() {
        let profile = CreditProfile {
            income: 85_000.0,
            debt_ratio: 0.35,
            credit_history_length: 12,
            num_credit_lines: 4,
            payment_history_score: 97.0,
        };
        let extractor = FeatureExtractor::new(credit_schema());
        let vector = extractor.extract(&profile.to_record()).unwrap();

        assert_eq!(vector.values, vec![85_000.0, 0.35, 12.0, 4.0, 97.0]);
        assert!(vector.validate(extractor.schema()).is_ok());
    }

    #[test]
    fn test_decode_policy_parse() {
        assert_eq!("Strict".parse::<DecodePolicy>().unwrap(), DecodePolicy::Strict);
        assert_eq!("lenient".parse::<DecodePolicy>().unwrap(), DecodePolicy::Lenient);
        assert!("whatever".parse::<DecodePolicy>().is_err());
    }
}
