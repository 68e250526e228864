use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use log::info;

const SSID: &str = env!("WIFI_SSID");
const PASSWORD: &str = env!("WIFI_PASS");

pub type Wifi = BlockingWifi<EspWifi<'static>>;

/// Joins the configured access point and waits for an IP address.
pub fn connect(wifi: &mut Wifi) -> anyhow::Result<()> {
    let wifi_configuration: Configuration = Configuration::Client(ClientConfiguration {
        ssid: SSID
            .try_into()
            .map_err(|_| anyhow::anyhow!("WIFI_SSID is too long"))?,
        bssid: None,
        auth_method: AuthMethod::WPA2Personal,
        password: PASSWORD
            .try_into()
            .map_err(|_| anyhow::anyhow!("WIFI_PASS is too long"))?,
        channel: None,
        ..Default::default()
    });

    wifi.set_configuration(&wifi_configuration)?;

    wifi.start()?;
    info!("Wifi started");

    wifi.connect()?;
    info!("Wifi connected");

    wifi.wait_netif_up()?;
    info!("Wifi netif up");

    Ok(())
}
