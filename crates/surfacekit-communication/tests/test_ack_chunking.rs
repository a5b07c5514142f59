use proptest::prelude::*;
use surfacekit_communication::AckAccumulator;

const RESPONSE: &str = "echo:busy: processing\r\nX:1.50 Y:-2.25 Z:0.10 E:0.00\r\nok\r\n";

proptest! {
    // However the controller's reply is split into reads, the completed
    // response is the same and is only reported once the sentinel line ends.
    #[test]
    fn response_independent_of_chunking(cuts in proptest::collection::btree_set(1usize..RESPONSE.len(), 0..8)) {
        let mut acc = AckAccumulator::new();
        let mut start = 0;
        let mut result = None;

        for end in cuts.into_iter().chain(std::iter::once(RESPONSE.len())) {
            prop_assert!(result.is_none());
            result = acc.push(&RESPONSE[start..end]);
            start = end;
        }

        prop_assert_eq!(
            result,
            Some(vec![
                "echo:busy: processing".to_string(),
                "X:1.50 Y:-2.25 Z:0.10 E:0.00".to_string(),
            ])
        );
    }
}

#[test]
fn test_multibyte_character_split_across_reads() {
    let response = "echo:Température 25°C\nok\n".as_bytes();
    let split = response.iter().position(|&b| b == 0xC3).unwrap() + 1;

    let mut acc = AckAccumulator::new();
    assert_eq!(acc.push(&response[..split]), None);
    assert_eq!(
        acc.push(&response[split..]),
        Some(vec!["echo:Température 25°C".to_string()])
    );
}
