use super::DeskStore;
use crate::{
    error::DeskResult,
    transfer::{NewTransfer, NewVerificationForm, TransferRecord, VerificationForm},
    types::{AgentId, FormId, Timestamp, TransferId},
};
use rusqlite::{params, OptionalExtension};
use std::collections::BTreeMap;

const TRANSFER_COLUMNS: &str = "transfer_id, reference_number, customer_name, customer_email,
    from_institution, to_institution, account_number, account_type, transfer_type,
    transfer_amount, status, initiated_date, expected_completion, notes, created_at, updated_at";

const FORM_COLUMNS: &str = "form_id, form_number, transfer_id, account_holder_name,
    account_number_on_form, account_type_on_form, transfer_amount_on_form, transfer_type_on_form,
    signature_date, form_pdf_url, verified, verification_notes, verified_by, verified_at, created_at";

fn transfer_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransferRecord> {
    Ok(TransferRecord {
        id: row.get(0)?,
        reference_number: row.get(1)?,
        customer_name: row.get(2)?,
        customer_email: row.get(3)?,
        from_institution: row.get(4)?,
        to_institution: row.get(5)?,
        account_number: row.get(6)?,
        account_type: row.get(7)?,
        transfer_type: row.get(8)?,
        transfer_amount: row.get(9)?,
        status: row.get(10)?,
        initiated_date: row.get(11)?,
        expected_completion: row.get(12)?,
        notes: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn form_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<VerificationForm> {
    Ok(VerificationForm {
        id: row.get(0)?,
        form_number: row.get(1)?,
        transfer_id: row.get(2)?,
        account_holder_name: row.get(3)?,
        account_number_on_form: row.get(4)?,
        account_type_on_form: row.get(5)?,
        transfer_amount_on_form: row.get(6)?,
        transfer_type_on_form: row.get(7)?,
        signature_date: row.get(8)?,
        form_pdf_url: row.get(9)?,
        verified: row.get::<_, i32>(10)? != 0,
        verification_notes: row.get(11)?,
        verified_by: row.get(12)?,
        verified_at: row.get(13)?,
        created_at: row.get(14)?,
    })
}

impl DeskStore {
    // ── Transfer ──────────────────────────────────────────────────

    pub fn insert_transfer(&self, t: &NewTransfer, created_at: Timestamp) -> DeskResult<TransferId> {
        self.conn.execute(
            "INSERT INTO transfer (
                reference_number, customer_name, customer_email, from_institution,
                to_institution, account_number, account_type, transfer_type,
                transfer_amount, status, initiated_date, expected_completion, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                &t.reference_number,
                &t.customer_name,
                t.customer_email.as_deref(),
                &t.from_institution,
                &t.to_institution,
                &t.account_number,
                &t.account_type,
                &t.transfer_type,
                t.transfer_amount,
                &t.status,
                t.initiated_date,
                t.expected_completion,
                t.notes.as_deref(),
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_transfer(&self, transfer_id: TransferId) -> DeskResult<Option<TransferRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {TRANSFER_COLUMNS} FROM transfer WHERE transfer_id = ?1"),
                params![transfer_id],
                transfer_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn transfer_by_reference(&self, reference_number: &str) -> DeskResult<Option<TransferRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {TRANSFER_COLUMNS} FROM transfer WHERE reference_number = ?1"),
                params![reference_number],
                transfer_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Newest first.
    pub fn list_transfers(
        &self,
        status: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> DeskResult<Vec<TransferRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfer
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, transfer_id DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(params![status, limit, offset], transfer_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn transfer_counts_by_status(&self) -> DeskResult<BTreeMap<String, i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM transfer GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
    }

    /// `None` leaves the stored value untouched.
    pub fn update_transfer(
        &self,
        transfer_id: TransferId,
        status: Option<&str>,
        notes: Option<&str>,
        at: Timestamp,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE transfer
             SET status = COALESCE(?1, status), notes = COALESCE(?2, notes), updated_at = ?3
             WHERE transfer_id = ?4",
            params![status, notes, at, transfer_id],
        )?;
        Ok(())
    }

    // ── Verification form ─────────────────────────────────────────

    pub fn insert_form(&self, f: &NewVerificationForm, created_at: Timestamp) -> DeskResult<FormId> {
        self.conn.execute(
            "INSERT INTO verification_form (
                form_number, transfer_id, account_holder_name, account_number_on_form,
                account_type_on_form, transfer_amount_on_form, transfer_type_on_form,
                signature_date, form_pdf_url, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &f.form_number,
                f.transfer_id,
                &f.account_holder_name,
                &f.account_number_on_form,
                &f.account_type_on_form,
                f.transfer_amount_on_form,
                &f.transfer_type_on_form,
                f.signature_date,
                f.form_pdf_url.as_deref(),
                created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_form(&self, form_id: FormId) -> DeskResult<Option<VerificationForm>> {
        self.conn
            .query_row(
                &format!("SELECT {FORM_COLUMNS} FROM verification_form WHERE form_id = ?1"),
                params![form_id],
                form_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn list_forms(
        &self,
        verified: Option<bool>,
        offset: u32,
        limit: u32,
    ) -> DeskResult<Vec<VerificationForm>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FORM_COLUMNS} FROM verification_form
             WHERE (?1 IS NULL OR verified = ?1)
             ORDER BY created_at DESC, form_id DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let verified = verified.map(i32::from);
        let rows = stmt.query_map(params![verified, limit, offset], form_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn form_for_transfer(&self, transfer_id: TransferId) -> DeskResult<Option<VerificationForm>> {
        self.conn
            .query_row(
                &format!("SELECT {FORM_COLUMNS} FROM verification_form WHERE transfer_id = ?1"),
                params![transfer_id],
                form_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn set_form_verification(
        &self,
        form_id: FormId,
        verified: bool,
        notes: Option<&str>,
        verified_by: AgentId,
        verified_at: Timestamp,
    ) -> DeskResult<()> {
        self.conn.execute(
            "UPDATE verification_form
             SET verified = ?1, verification_notes = ?2, verified_by = ?3, verified_at = ?4
             WHERE form_id = ?5",
            params![
                if verified { 1i32 } else { 0i32 },
                notes,
                verified_by,
                verified_at,
                form_id,
            ],
        )?;
        Ok(())
    }
}
