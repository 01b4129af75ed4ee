//! Built-in code tables for the panel handler
//!
//! CEID names, RPTID layouts and the alarm list as configured on the equipment.
//! Additional or site-specific entries are loaded on top of these through
//! [`CodeTables::load_toml_str`](super::CodeTables::load_toml_str).

use super::database::Severity;

/// Report id whose payload carries `[clock, alarm id, alarm set]`
pub const ALARM_REPORT_ID: u32 = 101;

/// CEID → event name
pub const EVENT_NAMES: &[(u32, &str)] = &[
    // GEM events
    (7, "GemOpCommand"),
    (11, "Equipment Offline"),
    (12, "Control State Local"),
    (13, "Control State Remote"),
    (14, "GemMsgRecognition"),
    (16, "PP-SELECT Changed"),
    (30, "Process State Change"),
    (101, "Alarm Cleared"),
    (102, "Alarm Set"),
    // Alarm events raised directly by CEID
    (18, "AlarmSet"),
    (113, "AlarmSet"),
    (114, "AlarmSet"),
    // Equipment inherent events
    (120, "IDRead"),
    (121, "UnloadedFromMag/LoadedToTool"),
    (127, "LoadedToTool"),
    (131, "LoadToToolCompleted"),
    (132, "UnloadFromToolCompleted"),
    (136, "MappingCompleted"),
    (141, "PortStatusChange"),
    (151, "MagazineDocked"),
    (180, "RequestMagazineDock"),
    (181, "MagazineDocked"),
    (182, "MagazineUndocked"),
    (183, "RequestOperatorIdCheck"),
    (184, "RequestOperatorLogin"),
    (185, "RequestMappingCheck"),
];

/// RPTID → positional field names
pub const REPORT_FIELDS: &[(u32, &[&str])] = &[
    (8, &["OperatorCommand"]),
    (11, &["ControlState"]),
    (14, &["Clock"]),
    (16, &["PPChangeName", "PPChangeStatus"]),
    (32, &["ProcessState", "PreviousProcessState"]),
    (101, &["AlarmID", "AlarmSet"]),
    (120, &["LotID", "PanelID", "Orientation", "ResultCode", "SlotID"]),
    (121, &["LotID", "PanelID", "SourcePortID"]),
    (141, &["PortID", "PortStatus"]),
    (150, &["MagazineID"]),
    (151, &["PortID", "MagazineID", "OperatorID"]),
    (152, &["OperatorID"]),
];

/// Alarm id → (description, severity)
pub const ALARMS: &[(u32, &str, Severity)] = &[
    (1, "<0001>CPU error", Severity::Error),
    (2, "<0002>SafetyPLC error", Severity::Error),
    (9, "<0051>EtherNet/IP error", Severity::Error),
    (10, "<0052>Profinet Communication Error", Severity::Error),
    (14, "<0056>Type setting error", Severity::Error),
    (15, "<0057>LP Layout setting not selected", Severity::Error),
    (17, "<0190>Emergency stop", Severity::Error),
    (18, "<0191>Safety door open", Severity::Error),
    (19, "<0192>Emergency stop(Option)", Severity::Error),
    (20, "<0193>Safety door open(Option)", Severity::Error),
    (21, "<0194>External EMO", Severity::Error),
    (65, "<0AE0>FAN warning", Severity::Warning),
    (66, "<0AE1>Production Interruped warning", Severity::Warning),
    (67, "<0AE2>Abnormaly-CommandEnd warning", Severity::Warning),
    (69, "<0AE4>Failed_CollectOperationRecord_HC", Severity::Warning),
    (70, "<0AE5>BFLMode-MES NoResponce", Severity::Warning),
    (71, "<0AE6>FFU1 warning", Severity::Warning),
    (72, "<0AE7>FFU2 warning", Severity::Warning),
    (73, "<0AE8>FFU3 warning", Severity::Warning),
    (74, "<0AE9>SYS_MCP_FAN1 Warning", Severity::Warning),
    (75, "<0AEA>SYS_MCP_FAN2 Warning", Severity::Warning),
    (76, "<0AEB>SYS_DC FAN1 Warning", Severity::Warning),
    (77, "<0AEC>SYS_DC FAN2 Warning", Severity::Warning),
    (78, "<0AED>SYS_DC FAN3 Warning", Severity::Warning),
    (79, "<0AEE>SYS_DC FAN4 Warning", Severity::Warning),
    (81, "<0AF0>VRS-Mode Waiting for SMEMA signal", Severity::Warning),
    (82, "<0AF1>VRS-ModeAbnormal Complete", Severity::Warning),
    (83, "<0AF2>Waiting the panel from VRS side", Severity::Warning),
    (84, "<0AF3>Vision not online", Severity::Warning),
    (97, "<1050>Panel fall out", Severity::Error),
    (98, "<1051>Interference error", Severity::Error),
    (99, "<1052>Conveyor driver error", Severity::Error),
    (100, "<1053>HNC not online", Severity::Error),
    (101, "<1054>Vision not online", Severity::Error),
    (102, "<1055>Homing impossible(W-Axis)", Severity::Error),
    (103, "<1056>CV driver Com. error", Severity::Error),
    (113, "<10F0>HNC error", Severity::Error),
    (114, "<10F1>Fork Coll.Detect error", Severity::Error),
    (129, "<1550>Panel existAlarm", Severity::Alarm),
    (131, "<1552>Panel pick NG", Severity::Alarm),
    (132, "<1553>Fork positionAlarm", Severity::Alarm),
    (133, "<1554>Order slot panel not exist", Severity::Alarm),
    (134, "<1555>Desitination slot panel exist", Severity::Alarm),
    (135, "<1556>SMEMA interface stop", Severity::Alarm),
    (136, "<1557>Panel positionAbnormally", Severity::Alarm),
    (137, "<1558>Motion time over [Pick]", Severity::Alarm),
    (138, "<1559>Motion time over [Place]", Severity::Alarm),
    (139, "<155A>Motion time over [Carry-in]", Severity::Alarm),
    (140, "<155B>Motion time over [Carry-out]", Severity::Alarm),
    (141, "<155C>Motion time over [Mapping]", Severity::Alarm),
    (142, "<155D>Motion time over [IDRead]", Severity::Alarm),
    (143, "<155E>Motion time over [Home]", Severity::Alarm),
    (144, "<155F>Panel separationAlarm", Severity::Alarm),
    (145, "<15A0>Process-Panel removed", Severity::Alarm),
    (146, "<15A1>Process-Panel existAlarm", Severity::Alarm),
    (147, "<15A2>Process-SMEMA signalAlarm", Severity::Alarm),
    (169, "<1A08>Direction wait time over", Severity::Alarm),
    (170, "<1A09>Magazine full warning", Severity::Warning),
    (171, "<1A0A>Mapping data mismatch", Severity::Alarm),
    (172, "<1A0B>ReplyMappingCheck Failed for MES", Severity::Alarm),
];
