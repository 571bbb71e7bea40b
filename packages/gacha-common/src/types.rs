use cosmwasm_schema::cw_serde;

/// The lifecycle status of a draw. `Revealed` is terminal.
#[cw_serde]
pub enum DrawStatus {
    Purchased,
    Revealed,
}

