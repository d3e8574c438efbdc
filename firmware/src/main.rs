#![no_std]
#![no_main]

use esp_backtrace as _;

#[rtic::app(device = esp32c3, dispatchers = [FROM_CPU_INTR0])]
mod app {
    use esp_hal::delay::Delay;
    use esp_hal::gpio::{Level, Output};
    use esp_hal::i2c::master::{self, I2c};
    use esp_hal::time::{Duration, Rate};
    use esp_hal::timer::timg::TimerGroup;
    use esp_hal::timer::PeriodicTimer;
    use esp_hal::Blocking;
    use esp_println::println;
    use thermo_shared::{
        Config, DigitalTube, DispenseError, Dispenser, Mlx90614, PollOutcome, TemperatureCell,
    };

    type Sensor = Mlx90614<I2c<'static, Blocking>>;

    const CONFIG: Config = Config::DEFAULT;

    // Program this emissivity into the sensor EEPROM at boot. None leaves it alone.
    const EMISSIVITY: Option<f64> = None;

    const I2C_KHZ: u32 = 100;
    // Fast enough that the multiplexed digits don't flicker
    const REFRESH_PERIOD_MS: u64 = 2;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        dispenser: Dispenser<'static, Sensor, Output<'static>, Delay>,
        tube: DigitalTube<Output<'static>>,
        refresh_timer: PeriodicTimer<'static, Blocking>,
        cell: &'static TemperatureCell,
    }

    #[init(local = [cell: TemperatureCell = TemperatureCell::new()])]
    fn init(cx: init::Context) -> (Shared, Local) {
        let peripherals = esp_hal::init(esp_hal::Config::default());
        let cell: &'static TemperatureCell = cx.local.cell;

        println!("booted!");
        println!("{:?}", CONFIG);

        // SDA 8, SCL 9
        let i2c = I2c::new(
            peripherals.I2C0,
            master::Config::default().with_frequency(Rate::from_khz(I2C_KHZ)),
        )
        .unwrap()
        .with_sda(peripherals.GPIO8)
        .with_scl(peripherals.GPIO9);

        let mut sensor = Mlx90614::new(i2c, CONFIG.sensor);
        let mut delay = Delay::new();

        if let Some(value) = EMISSIVITY {
            match sensor.set_emissivity(value, &mut delay) {
                Ok(update) => println!(
                    "emissivity 0x{:04x}/{} -> 0x{:04x}/{}",
                    update.old.coefficient,
                    update.old.factor,
                    update.new.coefficient,
                    update.new.factor
                ),
                Err(e) => println!("Emissivity update failed: {}", e),
            }
        }

        match sensor.read_emissivity(false) {
            Ok(e) => println!("Sensor at 0x{:02x}, emissivity {:.3}", sensor.address(), e),
            Err(e) => println!("Sensor at 0x{:02x} not responding: {}", sensor.address(), e),
        }

        let pump = Output::new(peripherals.GPIO3, Level::Low);
        let dispenser = Dispenser::new(sensor, pump, delay, cell, CONFIG.dispense);

        // SCLK 5, RCLK 6, DIO 7
        let tube = DigitalTube::new(
            Output::new(peripherals.GPIO5, Level::Low),
            Output::new(peripherals.GPIO6, Level::Low),
            Output::new(peripherals.GPIO7, Level::Low),
        );

        let timg0 = TimerGroup::new(peripherals.TIMG0);
        let mut refresh_timer = PeriodicTimer::new(timg0.timer0);
        refresh_timer.enable_interrupt(true);
        refresh_timer
            .start(Duration::from_millis(REFRESH_PERIOD_MS))
            .unwrap();

        (
            Shared {},
            Local {
                dispenser,
                tube,
                refresh_timer,
                cell,
            },
        )
    }

    // Poll loop. Failed reads are logged and retried on the next pass.
    #[idle(local = [dispenser])]
    fn idle(cx: idle::Context) -> ! {
        loop {
            match cx.local.dispenser.poll() {
                Ok(PollOutcome::Dispensed {
                    temperature,
                    missed_reads,
                }) => println!(
                    "Dispensed at {:.2}C ({} missed reads)",
                    temperature, missed_reads
                ),
                Ok(PollOutcome::Idle { .. }) => {}
                Ok(PollOutcome::Skipped(e)) => println!("Poll skipped: {}", e),
                Err(DispenseError::Pump(e)) => match e {},
            }
        }
    }

    #[task(binds = TG0_T0_LEVEL, local = [tube, refresh_timer, cell])]
    fn refresh_display(cx: refresh_display::Context) {
        cx.local.refresh_timer.clear_interrupt();
        if let Err(e) = cx.local.tube.refresh_from(cx.local.cell) {
            match e {}
        }
    }
}
