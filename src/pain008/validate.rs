//! Rule-based validation of serialized pain.008 documents.
//!
//! The generated XML is parsed back and checked against the structural rules
//! of pain.008.001.02. A failing document rejects its whole partition; the
//! caller keeps processing other partitions.

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::PAIN_008_NS;
use crate::core::{ValidationError, validation};

#[derive(Debug, Default)]
struct TxFacts {
    end_to_end: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    mandate_id: Option<String>,
    mandate_date: Option<String>,
    debtor_name: Option<String>,
    debtor_iban: Option<String>,
    debtor_bic: Option<String>,
}

#[derive(Debug, Default)]
struct BlockFacts {
    nb_of_txs: Option<String>,
    ctrl_sum: Option<String>,
    seq_tp: Option<String>,
    collection_date: Option<String>,
    creditor_name: Option<String>,
    creditor_iban: Option<String>,
    creditor_scheme_id: Option<String>,
    txs: Vec<TxFacts>,
}

#[derive(Debug, Default)]
struct DocFacts {
    namespace: Option<String>,
    msg_id: Option<String>,
    grp_nb_of_txs: Option<String>,
    grp_ctrl_sum: Option<String>,
    initiator_name: Option<String>,
    blocks: Vec<BlockFacts>,
}

fn parse_facts(xml: &str) -> Result<DocFacts, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = DocFacts::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();

                if name == "Document" && path.is_empty() {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"xmlns" {
                            doc.namespace =
                                Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
                if name == "PmtInf" {
                    doc.blocks.push(BlockFacts::default());
                }
                if name == "DrctDbtTxInf" {
                    if let Some(block) = doc.blocks.last_mut() {
                        block.txs.push(TxFacts::default());
                    }
                }
                if name == "InstdAmt" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"Ccy" {
                            if let Some(tx) =
                                doc.blocks.last_mut().and_then(|b| b.txs.last_mut())
                            {
                                tx.currency =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                }

                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    handle_text(&mut doc, &path, &text);
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {e}")),
        }
    }

    Ok(doc)
}

fn handle_text(doc: &mut DocFacts, path: &[String], text: &str) {
    let joined = path.join("/");
    let in_group_header = joined.contains("GrpHdr");
    let in_tx = joined.contains("DrctDbtTxInf");
    let leaf = match path.last() {
        Some(l) => l.as_str(),
        None => return,
    };

    if in_group_header {
        match leaf {
            "MsgId" => doc.msg_id = Some(text.to_string()),
            "NbOfTxs" => doc.grp_nb_of_txs = Some(text.to_string()),
            "CtrlSum" => doc.grp_ctrl_sum = Some(text.to_string()),
            "Nm" => doc.initiator_name = Some(text.to_string()),
            _ => {}
        }
        return;
    }

    let Some(block) = doc.blocks.last_mut() else {
        return;
    };

    if in_tx {
        let Some(tx) = block.txs.last_mut() else {
            return;
        };
        match leaf {
            "EndToEndId" => tx.end_to_end = Some(text.to_string()),
            "InstdAmt" => tx.amount = Some(text.to_string()),
            "MndtId" => tx.mandate_id = Some(text.to_string()),
            "DtOfSgntr" => tx.mandate_date = Some(text.to_string()),
            "Nm" if joined.contains("Dbtr") => tx.debtor_name = Some(text.to_string()),
            "IBAN" if joined.contains("DbtrAcct") => tx.debtor_iban = Some(text.to_string()),
            "BIC" if joined.contains("DbtrAgt") => tx.debtor_bic = Some(text.to_string()),
            _ => {}
        }
        return;
    }

    match leaf {
        "NbOfTxs" => block.nb_of_txs = Some(text.to_string()),
        "CtrlSum" => block.ctrl_sum = Some(text.to_string()),
        "SeqTp" => block.seq_tp = Some(text.to_string()),
        "ReqdColltnDt" => block.collection_date = Some(text.to_string()),
        "Nm" if joined.contains("Cdtr") => block.creditor_name = Some(text.to_string()),
        "IBAN" if joined.contains("CdtrAcct") => block.creditor_iban = Some(text.to_string()),
        "Id" if joined.contains("CdtrSchmeId") && joined.contains("Othr") => {
            block.creditor_scheme_id = Some(text.to_string())
        }
        _ => {}
    }
}

fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok()
}

fn check_amount(field: String, value: Option<&String>, errors: &mut Vec<ValidationError>) -> Decimal {
    let Some(raw) = value else {
        errors.push(ValidationError::new(field, "missing amount"));
        return Decimal::ZERO;
    };
    let Some(amount) = parse_amount(raw) else {
        errors.push(ValidationError::new(field, format!("'{raw}' is not a decimal amount")));
        return Decimal::ZERO;
    };
    if amount <= Decimal::ZERO {
        errors.push(ValidationError::new(field.clone(), "amount must be positive"));
    }
    if amount.scale() > 2 {
        errors.push(ValidationError::new(
            field,
            "amount must not carry more than two decimal places",
        ));
    }
    amount
}

fn check_name(field: String, value: Option<&String>, errors: &mut Vec<ValidationError>) {
    match value {
        None => errors.push(ValidationError::new(field, "missing name")),
        Some(n) if n.trim().is_empty() => {
            errors.push(ValidationError::new(field, "name must not be empty"))
        }
        Some(n) if n.chars().count() > 70 => {
            errors.push(ValidationError::new(field, "name must not exceed 70 characters"))
        }
        _ => {}
    }
}

fn check_date(field: String, value: Option<&String>, errors: &mut Vec<ValidationError>) {
    match value {
        None => errors.push(ValidationError::new(field, "missing date")),
        Some(d) => {
            if NaiveDate::from_str(d).is_err() {
                errors.push(ValidationError::new(field, format!("'{d}' is not an ISO date")));
            }
        }
    }
}

fn check_iban(field: String, value: Option<&String>, errors: &mut Vec<ValidationError>) {
    match value {
        None => errors.push(ValidationError::new(field, "missing IBAN")),
        Some(iban) => {
            if let Err(e) = validation::validate_iban(iban) {
                errors.push(ValidationError::new(field, e.to_string()));
            }
        }
    }
}

/// Validate a serialized pain.008.001.02 document. Returns all rule
/// violations found; an empty list means the file may be handed to a bank.
pub fn validate_pain008(xml: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let doc = match parse_facts(xml) {
        Ok(doc) => doc,
        Err(msg) => return vec![ValidationError::new("Document", msg)],
    };

    if doc.namespace.as_deref() != Some(PAIN_008_NS) {
        errors.push(ValidationError::new(
            "Document",
            format!("document namespace must be {PAIN_008_NS}"),
        ));
    }

    match &doc.msg_id {
        None => errors.push(ValidationError::new("GrpHdr/MsgId", "missing message ID")),
        Some(id) if id.is_empty() || id.chars().count() > 35 => errors.push(
            ValidationError::new("GrpHdr/MsgId", "message ID must be 1 to 35 characters"),
        ),
        _ => {}
    }
    check_name("GrpHdr/InitgPty/Nm".into(), doc.initiator_name.as_ref(), &mut errors);

    if doc.blocks.is_empty() {
        errors.push(ValidationError::new(
            "CstmrDrctDbtInitn",
            "document must contain at least one PmtInf block",
        ));
    }

    let mut total_txs = 0usize;
    let mut total_sum = Decimal::ZERO;

    for (bi, block) in doc.blocks.iter().enumerate() {
        let at = |leaf: &str| format!("PmtInf[{}]/{}", bi + 1, leaf);

        if block.txs.is_empty() {
            errors.push(ValidationError::new(
                at("DrctDbtTxInf"),
                "payment block must contain at least one transaction",
            ));
        }
        if block.seq_tp.as_deref() != Some("OOFF") {
            errors.push(ValidationError::new(
                at("PmtTpInf/SeqTp"),
                "sequence type must be OOFF for one-off mandates",
            ));
        }
        check_date(at("ReqdColltnDt"), block.collection_date.as_ref(), &mut errors);
        check_name(at("Cdtr/Nm"), block.creditor_name.as_ref(), &mut errors);
        check_iban(at("CdtrAcct/Id/IBAN"), block.creditor_iban.as_ref(), &mut errors);

        match &block.creditor_scheme_id {
            None => errors.push(ValidationError::new(
                at("CdtrSchmeId"),
                "missing creditor scheme identifier",
            )),
            Some(id) => {
                if let Err(e) = validation::validate_creditor_id(id) {
                    errors.push(ValidationError::new(at("CdtrSchmeId"), e.to_string()));
                }
            }
        }

        let mut block_sum = Decimal::ZERO;
        for (ti, tx) in block.txs.iter().enumerate() {
            let at_tx = |leaf: &str| format!("PmtInf[{}]/DrctDbtTxInf[{}]/{}", bi + 1, ti + 1, leaf);

            match &tx.end_to_end {
                None => errors.push(ValidationError::new(
                    at_tx("PmtId/EndToEndId"),
                    "missing end-to-end ID",
                )),
                Some(id) if id.chars().count() > 35 => errors.push(ValidationError::new(
                    at_tx("PmtId/EndToEndId"),
                    "end-to-end ID must not exceed 35 characters",
                )),
                _ => {}
            }

            block_sum += check_amount(at_tx("InstdAmt"), tx.amount.as_ref(), &mut errors);

            match &tx.currency {
                None => errors.push(ValidationError::new(at_tx("InstdAmt@Ccy"), "missing currency")),
                Some(c) if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_uppercase()) => {
                    errors.push(ValidationError::new(
                        at_tx("InstdAmt@Ccy"),
                        format!("'{c}' is not an ISO 4217 currency code"),
                    ))
                }
                _ => {}
            }

            match &tx.mandate_id {
                None => errors.push(ValidationError::new(
                    at_tx("MndtRltdInf/MndtId"),
                    "missing mandate reference",
                )),
                Some(id) => {
                    if id.chars().count() > 35 {
                        errors.push(ValidationError::new(
                            at_tx("MndtRltdInf/MndtId"),
                            "mandate reference must not exceed 35 characters",
                        ));
                    } else if let Err(e) = validation::validate_reference_charset(id) {
                        errors.push(ValidationError::new(
                            at_tx("MndtRltdInf/MndtId"),
                            e.to_string(),
                        ));
                    }
                }
            }
            check_date(at_tx("MndtRltdInf/DtOfSgntr"), tx.mandate_date.as_ref(), &mut errors);
            check_name(at_tx("Dbtr/Nm"), tx.debtor_name.as_ref(), &mut errors);
            check_iban(at_tx("DbtrAcct/Id/IBAN"), tx.debtor_iban.as_ref(), &mut errors);

            match &tx.debtor_bic {
                None => errors.push(ValidationError::new(
                    at_tx("DbtrAgt/FinInstnId/BIC"),
                    "missing BIC",
                )),
                Some(bic) => {
                    if let Err(e) = validation::validate_bic(bic) {
                        errors.push(ValidationError::new(
                            at_tx("DbtrAgt/FinInstnId/BIC"),
                            e.to_string(),
                        ));
                    }
                }
            }
        }

        // Per-block count/sum consistency.
        if block.nb_of_txs.as_deref() != Some(block.txs.len().to_string().as_str()) {
            errors.push(ValidationError::new(
                at("NbOfTxs"),
                format!(
                    "declared transaction count {:?} does not match actual count {}",
                    block.nb_of_txs,
                    block.txs.len()
                ),
            ));
        }
        if block.ctrl_sum.as_ref().and_then(|s| parse_amount(s)) != Some(block_sum) {
            errors.push(ValidationError::new(
                at("CtrlSum"),
                format!(
                    "declared control sum {:?} does not match transaction sum {block_sum}",
                    block.ctrl_sum
                ),
            ));
        }

        total_txs += block.txs.len();
        total_sum += block_sum;
    }

    // Group header consistency over the whole file.
    if doc.grp_nb_of_txs.as_deref() != Some(total_txs.to_string().as_str()) {
        errors.push(ValidationError::new(
            "GrpHdr/NbOfTxs",
            format!(
                "declared transaction count {:?} does not match actual count {total_txs}",
                doc.grp_nb_of_txs
            ),
        ));
    }
    if doc.grp_ctrl_sum.as_ref().and_then(|s| parse_amount(s)) != Some(total_sum) {
        errors.push(ValidationError::new(
            "GrpHdr/CtrlSum",
            format!(
                "declared control sum {:?} does not match transaction sum {total_sum}",
                doc.grp_ctrl_sum
            ),
        ));
    }

    errors
}
