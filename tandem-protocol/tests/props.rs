//! Property tests for the frame codec and response table

use proptest::prelude::*;

use tandem_protocol::{CommandFrame, CommandIndex, ResponseTable, REFERENCE_TABLE, TURNAROUND_FILLER};

proptest! {
    #[test]
    fn only_the_command_byte_varies(command in any::<u8>()) {
        let bytes = CommandFrame::new(command).to_bytes();
        prop_assert_eq!(bytes[0], command);
        prop_assert_eq!(&bytes[1..], &TURNAROUND_FILLER[..]);
        prop_assert_eq!(CommandFrame::parse(&bytes).unwrap().command, command);
    }

    #[test]
    fn lookup_never_leaves_the_table(command in any::<u8>()) {
        let reply = REFERENCE_TABLE.lookup(command);
        let expected = REFERENCE_TABLE.row(command as usize).or(REFERENCE_TABLE.row(0)).unwrap();
        prop_assert_eq!(reply, expected);
    }

    #[test]
    fn index_stays_in_range(count in 1usize..=256, steps in 0usize..600) {
        let mut index = CommandIndex::new(count);
        for _ in 0..steps {
            prop_assert!((index.advance() as usize) < count);
        }
    }
}

#[test]
fn single_row_table_answers_everything() {
    let table: ResponseTable<1> = ResponseTable::new([[0xEE; 8]]);
    for command in [0u8, 1, 128, 255] {
        assert_eq!(table.lookup(command), &[0xEE; 8]);
    }
}
