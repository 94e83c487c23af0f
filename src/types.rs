/// Wiki-style page title naming one captured document.
/// Example: `Nelson_Mandela`
pub type PageKey = String;
/// Table identifier composed of a page key and an ordinal.
/// Example: `List_of_Olympic_medalists_in_judo_3`
pub type TableId = String;
/// Raw hyperlink target stored beside a cell fragment; empty means no link.
/// Example: `/wiki/Nelson_Mandela`
pub type LinkTarget = String;
/// Conversation identifier from the dataset document.
/// Example: `conv_00042`
pub type ConversationId = String;
/// Turn identifier from the dataset document.
/// Example: `conv_00042_3`
pub type TurnId = String;
/// Candidate response identifier from the dataset document.
/// Example: `cand_17201`
pub type CandidateId = String;
/// Resolved display string of one table cell.
/// Example: `Nelson Mandela: Nelson Rolihlahla Mandela was a South African...`
pub type CellText = String;
