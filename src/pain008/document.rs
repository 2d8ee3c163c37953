//! pain.008 Customer Direct Debit Initiation document model.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::xml_utils::{XmlResult, XmlWriter, format_cents};
use super::{PAIN_008_NS, XSI_NS};
use crate::core::{CreditorKey, DebitError};

/// One direct-debit transaction inside a file.
#[derive(Debug, Clone)]
pub struct DebitTransaction {
    /// End-to-end identifier; generated from the message ID when absent.
    pub end_to_end_id: Option<String>,
    pub debtor_name: String,
    pub debtor_iban: String,
    pub debtor_bic: String,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// Date the bank is instructed to collect on.
    pub collection_date: NaiveDate,
    /// Mandate reference previously assigned to the payment.
    pub mandate_id: String,
    /// Mandate signing date (the order's placement date).
    pub mandate_date: NaiveDate,
    /// Unstructured remittance info shown to the debtor.
    pub description: String,
}

/// Convert a decimal amount to integer cents.
///
/// SEPA amounts carry at most two decimals; anything finer is rejected
/// rather than rounded, since the captured amount must match the host's
/// books to the cent.
pub fn amount_to_cents(amount: Decimal) -> Result<i64, DebitError> {
    let scaled = amount * Decimal::ONE_HUNDRED;
    if !scaled.fract().is_zero() {
        return Err(DebitError::Amount(format!(
            "amount {amount} is not expressible in whole cents"
        )));
    }
    scaled
        .trunc()
        .to_i64()
        .ok_or_else(|| DebitError::Amount(format!("amount {amount} out of range")))
}

/// An accumulating pain.008.001.02 document for one creditor configuration.
///
/// Transactions are grouped into one `PmtInf` block per collection date at
/// render time, so a mixed-date file stays schema-valid (each block is
/// single-dated) even though banks differ on whether they accept it.
#[derive(Debug, Clone)]
pub struct DebitDocument {
    creditor: CreditorKey,
    msg_id: String,
    created_at: DateTime<Utc>,
    transactions: Vec<DebitTransaction>,
}

impl DebitDocument {
    pub fn new(
        creditor: CreditorKey,
        msg_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            creditor,
            msg_id: msg_id.into(),
            created_at,
            transactions: Vec::new(),
        }
    }

    pub fn add_transaction(&mut self, tx: DebitTransaction) {
        self.transactions.push(tx);
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Sum of all transaction amounts in cents.
    pub fn control_sum_cents(&self) -> i64 {
        self.transactions.iter().map(|t| t.amount_cents).sum()
    }

    pub fn creditor(&self) -> &CreditorKey {
        &self.creditor
    }

    /// Render the document to pain.008.001.02 XML.
    pub fn render(&self) -> XmlResult {
        if self.transactions.is_empty() {
            return Err(DebitError::Builder(
                "document contains no transactions".to_string(),
            ));
        }

        // One PmtInf per collection date, dates in ascending order.
        let mut blocks: BTreeMap<NaiveDate, Vec<&DebitTransaction>> = BTreeMap::new();
        for tx in &self.transactions {
            blocks.entry(tx.collection_date).or_default().push(tx);
        }

        let mut w = XmlWriter::new()?;
        w.start_element_with_attrs("Document", &[("xmlns", PAIN_008_NS), ("xmlns:xsi", XSI_NS)])?;
        w.start_element("CstmrDrctDbtInitn")?;

        w.start_element("GrpHdr")?;
        w.text_element("MsgId", &self.msg_id)?;
        w.text_element(
            "CreDtTm",
            &self.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )?;
        w.text_element("NbOfTxs", &self.transactions.len().to_string())?;
        w.text_element("CtrlSum", &format_cents(self.control_sum_cents()))?;
        w.start_element("InitgPty")?;
        w.text_element("Nm", &self.creditor.name)?;
        w.end_element("InitgPty")?;
        w.end_element("GrpHdr")?;

        let mut tx_seq = 0usize;
        for (block_idx, (date, txs)) in blocks.iter().enumerate() {
            let block_sum: i64 = txs.iter().map(|t| t.amount_cents).sum();

            w.start_element("PmtInf")?;
            w.text_element("PmtInfId", &format!("{}-P{}", self.msg_id, block_idx + 1))?;
            w.text_element("PmtMtd", "DD")?;
            w.text_element("BtchBookg", "true")?;
            w.text_element("NbOfTxs", &txs.len().to_string())?;
            w.text_element("CtrlSum", &format_cents(block_sum))?;

            w.start_element("PmtTpInf")?;
            w.start_element("SvcLvl")?;
            w.text_element("Cd", "SEPA")?;
            w.end_element("SvcLvl")?;
            w.start_element("LclInstrm")?;
            w.text_element("Cd", "CORE")?;
            w.end_element("LclInstrm")?;
            // Mandates are collected per order, so every debit is one-off.
            w.text_element("SeqTp", "OOFF")?;
            w.end_element("PmtTpInf")?;

            w.text_element("ReqdColltnDt", &date.to_string())?;

            w.start_element("Cdtr")?;
            w.text_element("Nm", &self.creditor.name)?;
            w.end_element("Cdtr")?;
            w.start_element("CdtrAcct")?;
            w.start_element("Id")?;
            w.text_element("IBAN", &self.creditor.iban)?;
            w.end_element("Id")?;
            w.end_element("CdtrAcct")?;
            w.start_element("CdtrAgt")?;
            w.start_element("FinInstnId")?;
            w.text_element("BIC", &self.creditor.bic)?;
            w.end_element("FinInstnId")?;
            w.end_element("CdtrAgt")?;

            w.text_element("ChrgBr", "SLEV")?;

            w.start_element("CdtrSchmeId")?;
            w.start_element("Id")?;
            w.start_element("PrvtId")?;
            w.start_element("Othr")?;
            w.text_element("Id", &self.creditor.creditor_id)?;
            w.start_element("SchmeNm")?;
            w.text_element("Prtry", "SEPA")?;
            w.end_element("SchmeNm")?;
            w.end_element("Othr")?;
            w.end_element("PrvtId")?;
            w.end_element("Id")?;
            w.end_element("CdtrSchmeId")?;

            for tx in txs {
                tx_seq += 1;
                let end_to_end = tx
                    .end_to_end_id
                    .clone()
                    .unwrap_or_else(|| format!("{}-T{}", self.msg_id, tx_seq));

                w.start_element("DrctDbtTxInf")?;
                w.start_element("PmtId")?;
                w.text_element("EndToEndId", &end_to_end)?;
                w.end_element("PmtId")?;
                w.amount_element("InstdAmt", tx.amount_cents, &self.creditor.currency)?;
                w.start_element("DrctDbtTx")?;
                w.start_element("MndtRltdInf")?;
                w.text_element("MndtId", &tx.mandate_id)?;
                w.text_element("DtOfSgntr", &tx.mandate_date.to_string())?;
                w.end_element("MndtRltdInf")?;
                w.end_element("DrctDbtTx")?;
                w.start_element("DbtrAgt")?;
                w.start_element("FinInstnId")?;
                w.text_element("BIC", &tx.debtor_bic)?;
                w.end_element("FinInstnId")?;
                w.end_element("DbtrAgt")?;
                w.start_element("Dbtr")?;
                w.text_element("Nm", &tx.debtor_name)?;
                w.end_element("Dbtr")?;
                w.start_element("DbtrAcct")?;
                w.start_element("Id")?;
                w.text_element("IBAN", &tx.debtor_iban)?;
                w.end_element("Id")?;
                w.end_element("DbtrAcct")?;
                w.start_element("RmtInf")?;
                w.text_element("Ustrd", &tx.description)?;
                w.end_element("RmtInf")?;
                w.end_element("DrctDbtTxInf")?;
            }

            w.end_element("PmtInf")?;
        }

        w.end_element("CstmrDrctDbtInitn")?;
        w.end_element("Document")?;
        w.into_string()
    }
}
