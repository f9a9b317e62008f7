//! Three-letter ISCP message codes

pub const POWER: &str = "PWR";
pub const RECEIVER_INFORMATION: &str = "NRI";
pub const FRIENDLY_NAME: &str = "NFN";
pub const INPUT_SELECTOR: &str = "SLI";
pub const DIMMER_LEVEL: &str = "DIM";
pub const DIGITAL_FILTER: &str = "DGF";

pub const MASTER_VOLUME: &str = "MVL";
pub const AUDIO_MUTING: &str = "AMT";
pub const LISTENING_MODE: &str = "LMD";
pub const TONE_FRONT: &str = "TFR";

pub const JACKET_ART: &str = "NJA";
pub const ARTIST_NAME: &str = "NAT";
pub const ALBUM_NAME: &str = "NAL";
pub const TITLE_NAME: &str = "NTI";
pub const TIME_INFO: &str = "NTM";
pub const TRACK_INFO: &str = "NTR";
pub const FILE_FORMAT: &str = "NFI";
pub const PLAY_STATUS: &str = "NST";
pub const MENU_STATUS: &str = "NMS";

pub const LIST_TITLE_INFO: &str = "NLT";
pub const LIST_INFO: &str = "NLS";
pub const XML_LIST_INFO: &str = "NLA";
pub const XML_LIST_ITEM: &str = "NLI";

pub const OPERATION: &str = "NTC";
pub const NETWORK_SERVICE: &str = "NSV";
pub const DISPLAY_MODE: &str = "DIF";
pub const TIME_SEEK: &str = "NTS";
pub const PLAY_QUEUE_ADD: &str = "PQA";
pub const PLAY_QUEUE_REMOVE: &str = "PQR";

/// Parameter that turns any code into a status query
pub const QUERY: &str = "QSTN";
